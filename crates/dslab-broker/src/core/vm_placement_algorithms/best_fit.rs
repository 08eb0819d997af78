//! Best Fit algorithm.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::VmPlacementAlgorithm;

/// Uses the suitable host with the fewest free PEs.
#[derive(Default)]
pub struct BestFit;

impl BestFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl VmPlacementAlgorithm for BestFit {
    fn allocate_host(
        &mut self,
        vm: &VirtualMachine,
        hosts: &mut CircularHostList,
        ledger: &mut CapacityLedger,
    ) -> Option<u32> {
        let host = hosts.with_minimum_free_pes(vm.pes, ledger)?;
        if ledger.reserve(vm.id, host, vm.pes) {
            Some(host)
        } else {
            None
        }
    }
}
