//! Worst Fit algorithm.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::{allocate_with_retries, VmPlacementAlgorithm};

/// Uses the host with the fewest PEs in use, recomputed on every attempt.
///
/// Ties are resolved in favor of the host which comes first in the list.
#[derive(Default)]
pub struct WorstFit;

impl WorstFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl VmPlacementAlgorithm for WorstFit {
    fn allocate_host(
        &mut self,
        vm: &VirtualMachine,
        hosts: &mut CircularHostList,
        ledger: &mut CapacityLedger,
    ) -> Option<u32> {
        allocate_with_retries(vm, hosts, ledger, |eligible, ledger| {
            eligible.iter().copied().min_by_key(|&host| ledger.used_pes(host))
        })
    }
}
