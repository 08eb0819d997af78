//! Round Robin algorithm.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::VmPlacementAlgorithm;

/// Takes hosts one after another from the rotating host list.
///
/// If the next host cannot fit the VM, the following one is tried, so that each host is tried at most once
/// per call. The rotation advances on failed attempts too.
#[derive(Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Default::default()
    }
}

impl VmPlacementAlgorithm for RoundRobin {
    fn allocate_host(
        &mut self,
        vm: &VirtualMachine,
        hosts: &mut CircularHostList,
        ledger: &mut CapacityLedger,
    ) -> Option<u32> {
        for _ in 0..hosts.len() {
            let host = hosts.next()?;
            if ledger.reserve(vm.id, host, vm.pes) {
                return Some(host);
            }
        }
        None
    }
}
