//! Placement of VMs onto datacenter hosts.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::common::Allocation;
use crate::core::host::PhysicalHost;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::VmPlacementAlgorithm;

/// Maps VMs to physical hosts of a single datacenter.
///
/// Owns the host list, the capacity ledger and the configured placement algorithm.
/// The ledger is mutated only through this policy.
pub struct VmAllocationPolicy {
    hosts: Vec<PhysicalHost>,
    host_list: CircularHostList,
    ledger: CapacityLedger,
    algorithm: Box<dyn VmPlacementAlgorithm>,
}

impl VmAllocationPolicy {
    pub fn new(hosts: Vec<PhysicalHost>, algorithm: Box<dyn VmPlacementAlgorithm>) -> Self {
        let mut ledger = CapacityLedger::new();
        ledger.register(&hosts);
        let host_list = CircularHostList::new(hosts.iter().map(|host| host.id).collect());
        Self {
            hosts,
            host_list,
            ledger,
            algorithm,
        }
    }

    /// Adds host to the end of host list.
    pub fn add_host(&mut self, host: PhysicalHost) {
        self.ledger.register(std::slice::from_ref(&host));
        self.host_list.add(host.id);
        self.hosts.push(host);
    }

    /// Selects a host for the VM and reserves its PEs there.
    ///
    /// If the VM is already placed, returns its current host without changing anything.
    pub fn place(&mut self, vm: &VirtualMachine) -> Option<u32> {
        if let Some(host) = self.ledger.host_of(vm.id) {
            return Some(host);
        }
        let host = self.algorithm.allocate_host(vm, &mut self.host_list, &mut self.ledger);
        match host {
            Some(host_id) => assert_eq!(
                self.ledger.host_of(vm.id),
                Some(host_id),
                "placement algorithm returned host {} without reserving vm {} there",
                host_id,
                vm.id
            ),
            None => assert_eq!(
                self.ledger.host_of(vm.id),
                None,
                "placement algorithm left a reservation for unplaced vm {}",
                vm.id
            ),
        }
        host
    }

    /// Releases PEs held by the VM. Returns `None` if the VM was not placed by this policy.
    pub fn deallocate(&mut self, vm_id: u32) -> Option<Allocation> {
        self.ledger.release(vm_id)
    }

    pub fn host_of(&self, vm_id: u32) -> Option<u32> {
        self.ledger.host_of(vm_id)
    }

    pub fn hosts(&self) -> &[PhysicalHost] {
        &self.hosts
    }

    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }
}
