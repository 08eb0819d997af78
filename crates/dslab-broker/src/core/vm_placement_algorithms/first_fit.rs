//! First Fit algorithm.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::VmPlacementAlgorithm;

/// Uses the first host in list order with enough free PEs.
#[derive(Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl VmPlacementAlgorithm for FirstFit {
    fn allocate_host(
        &mut self,
        vm: &VirtualMachine,
        hosts: &mut CircularHostList,
        ledger: &mut CapacityLedger,
    ) -> Option<u32> {
        hosts
            .get()
            .iter()
            .copied()
            .find(|&host| ledger.reserve(vm.id, host, vm.pes))
    }
}
