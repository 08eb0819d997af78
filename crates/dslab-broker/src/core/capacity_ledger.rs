//! Processing element accounting for datacenter hosts.

use std::collections::{BTreeMap, HashMap};

use crate::core::common::{Allocation, AllocationVerdict};
use crate::core::host::PhysicalHost;

#[derive(Clone, Debug)]
struct HostEntry {
    total_pes: u32,
    free_pes: u32,
    mips: f64,
}

/// Authoritative record of free and used PEs on each host of a datacenter.
///
/// For every host `free_pes(host) == total_pes(host) - sum(pes of VMs reserved on host)` holds after each call.
/// A VM appears in the ledger at most once, and releasing it restores the free count of its host exactly.
#[derive(Clone, Debug, Default)]
pub struct CapacityLedger {
    hosts: BTreeMap<u32, HostEntry>,
    allocations: HashMap<u32, Allocation>,
}

impl CapacityLedger {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers hosts with all of their PEs free. Already known hosts are left untouched.
    pub fn register(&mut self, hosts: &[PhysicalHost]) {
        for host in hosts {
            self.hosts.entry(host.id).or_insert(HostEntry {
                total_pes: host.pes,
                free_pes: host.pes,
                mips: host.mips,
            });
        }
    }

    /// Checks if the specified amount of PEs can currently be reserved on the host.
    pub fn can_reserve(&self, host_id: u32, pes: u32) -> AllocationVerdict {
        match self.hosts.get(&host_id) {
            None => AllocationVerdict::HostNotFound,
            Some(host) if host.free_pes < pes => AllocationVerdict::NotEnoughPes,
            Some(_) => AllocationVerdict::Success,
        }
    }

    /// Reserves PEs for the VM on the host. Returns `false` and leaves the ledger unchanged
    /// if the host is unknown or does not have enough free PEs.
    ///
    /// Panics if the VM already holds a reservation.
    pub fn reserve(&mut self, vm_id: u32, host_id: u32, pes: u32) -> bool {
        if let Some(existing) = self.allocations.get(&vm_id) {
            panic!(
                "vm {} is already reserved on host {}, refusing to reserve it on host {}",
                vm_id, existing.host_id, host_id
            );
        }
        if self.can_reserve(host_id, pes) != AllocationVerdict::Success {
            return false;
        }
        if let Some(host) = self.hosts.get_mut(&host_id) {
            host.free_pes -= pes;
        }
        self.allocations.insert(vm_id, Allocation { vm_id, host_id, pes });
        self.check_host(host_id);
        true
    }

    /// Removes the reservation of the VM and returns it.
    ///
    /// Returns `None` if the VM is unknown, which means a caller-side ordering bug; the ledger is not modified.
    pub fn release(&mut self, vm_id: u32) -> Option<Allocation> {
        let alloc = self.allocations.remove(&vm_id)?;
        if let Some(host) = self.hosts.get_mut(&alloc.host_id) {
            host.free_pes += alloc.pes;
        }
        self.check_host(alloc.host_id);
        Some(alloc)
    }

    /// Returns the reservation of the VM if it exists.
    pub fn allocation(&self, vm_id: u32) -> Option<&Allocation> {
        self.allocations.get(&vm_id)
    }

    /// Returns the host where the VM is reserved.
    pub fn host_of(&self, vm_id: u32) -> Option<u32> {
        self.allocations.get(&vm_id).map(|alloc| alloc.host_id)
    }

    /// Returns IDs of all hosts in ascending order.
    pub fn get_host_ids(&self) -> Vec<u32> {
        self.hosts.keys().cloned().collect()
    }

    pub fn host_count(&self) -> u32 {
        self.hosts.len() as u32
    }

    /// Returns the number of free PEs on the host, 0 for unknown hosts.
    pub fn free_pes(&self, host_id: u32) -> u32 {
        self.hosts.get(&host_id).map_or(0, |host| host.free_pes)
    }

    /// Returns the total number of PEs on the host, 0 for unknown hosts.
    pub fn total_pes(&self, host_id: u32) -> u32 {
        self.hosts.get(&host_id).map_or(0, |host| host.total_pes)
    }

    /// Returns the number of PEs of the host currently used by VMs.
    pub fn used_pes(&self, host_id: u32) -> u32 {
        self.total_pes(host_id) - self.free_pes(host_id)
    }

    /// Returns the free capacity of the host in MIPS.
    pub fn available_mips(&self, host_id: u32) -> f64 {
        self.hosts
            .get(&host_id)
            .map_or(0., |host| host.free_pes as f64 * host.mips)
    }

    /// Returns the number of VMs currently reserved on the host.
    pub fn vm_count(&self, host_id: u32) -> usize {
        self.allocations.values().filter(|alloc| alloc.host_id == host_id).count()
    }

    pub fn total_free_pes(&self) -> u32 {
        self.hosts.values().map(|host| host.free_pes).sum()
    }

    pub fn total_capacity_pes(&self) -> u32 {
        self.hosts.values().map(|host| host.total_pes).sum()
    }

    /// Recomputes free counts from reservations and compares them with the stored ones.
    pub fn is_consistent(&self) -> bool {
        self.hosts.iter().all(|(&host_id, host)| {
            let reserved: u32 = self
                .allocations
                .values()
                .filter(|alloc| alloc.host_id == host_id)
                .map(|alloc| alloc.pes)
                .sum();
            host.free_pes <= host.total_pes && host.free_pes + reserved == host.total_pes
        })
    }

    fn check_host(&self, host_id: u32) {
        if let Some(host) = self.hosts.get(&host_id) {
            assert!(
                host.free_pes <= host.total_pes,
                "host {} has {} free pes out of {}",
                host_id,
                host.free_pes,
                host.total_pes
            );
        }
        debug_assert!(self.is_consistent(), "capacity ledger is inconsistent after update of host {}", host_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> CapacityLedger {
        let mut ledger = CapacityLedger::new();
        ledger.register(&[PhysicalHost::new(0, "h0", 4, 1000.), PhysicalHost::new(1, "h1", 2, 500.)]);
        ledger
    }

    #[test]
    fn reserve_and_release_restore_free_pes() {
        let mut ledger = ledger();
        assert!(ledger.reserve(10, 0, 3));
        assert_eq!(ledger.free_pes(0), 1);
        assert_eq!(ledger.used_pes(0), 3);
        assert_eq!(ledger.host_of(10), Some(0));
        assert_eq!(ledger.vm_count(0), 1);
        assert_eq!(ledger.get_host_ids(), vec![0, 1]);

        let alloc = ledger.release(10).unwrap();
        assert_eq!(alloc.pes, 3);
        assert_eq!(ledger.free_pes(0), 4);
        assert_eq!(ledger.host_of(10), None);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn failed_reservation_leaves_ledger_untouched() {
        let mut ledger = ledger();
        assert!(!ledger.reserve(1, 1, 3));
        assert!(!ledger.reserve(1, 7, 1));
        assert_eq!(ledger.free_pes(1), 2);
        assert_eq!(ledger.allocation(1), None);
        assert!(ledger.is_consistent());
    }

    #[test]
    fn release_of_unknown_vm_is_tolerated() {
        let mut ledger = ledger();
        assert!(ledger.reserve(1, 0, 2));
        assert_eq!(ledger.release(2), None);
        assert_eq!(ledger.free_pes(0), 2);
        assert!(ledger.is_consistent());
    }

    #[test]
    #[should_panic(expected = "already reserved")]
    fn double_reservation_panics() {
        let mut ledger = ledger();
        assert!(ledger.reserve(1, 0, 1));
        ledger.reserve(1, 1, 1);
    }

    #[test]
    fn available_mips_follows_free_pes() {
        let mut ledger = ledger();
        assert_eq!(ledger.available_mips(0), 4000.);
        assert!(ledger.reserve(1, 0, 1));
        assert_eq!(ledger.available_mips(0), 3000.);
        assert_eq!(ledger.vm_count(0), 1);
        assert_eq!(ledger.total_free_pes(), 5);
    }
}
