//! Rank Based algorithm.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::{allocate_with_retries, VmPlacementAlgorithm};

/// Uses the host with the largest available capacity in MIPS (free PEs times PE capacity).
///
/// Ties are resolved in favor of the host which comes first in the list.
/// If the reservation fails, the host is excluded and the next best one is tried.
#[derive(Default)]
pub struct RankBased;

impl RankBased {
    pub fn new() -> Self {
        Default::default()
    }
}

impl VmPlacementAlgorithm for RankBased {
    fn allocate_host(
        &mut self,
        vm: &VirtualMachine,
        hosts: &mut CircularHostList,
        ledger: &mut CapacityLedger,
    ) -> Option<u32> {
        allocate_with_retries(vm, hosts, ledger, |eligible, ledger| {
            let mut result: Option<u32> = None;
            let mut max_available_mips = f64::MIN;
            for &host in eligible {
                let available_mips = ledger.available_mips(host);
                if available_mips > max_available_mips {
                    max_available_mips = available_mips;
                    result = Some(host);
                }
            }
            result
        })
    }
}
