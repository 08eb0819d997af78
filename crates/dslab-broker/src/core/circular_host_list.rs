//! Rotatable list of host IDs.

use crate::core::capacity_ledger::CapacityLedger;

/// Ordered host list with a rotation cursor used by round-robin placement.
///
/// The list keeps host IDs only, the current free capacity is always read from the [`CapacityLedger`].
#[derive(Clone, Debug, Default)]
pub struct CircularHostList {
    hosts: Vec<u32>,
    cursor: usize,
}

impl CircularHostList {
    pub fn new(hosts: Vec<u32>) -> Self {
        Self { hosts, cursor: 0 }
    }

    pub fn add(&mut self, host_id: u32) {
        self.hosts.push(host_id);
    }

    /// Returns the host at the cursor and advances the cursor modulo the list length.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<u32> {
        if self.hosts.is_empty() {
            return None;
        }
        let host = self.hosts[self.cursor % self.hosts.len()];
        self.cursor = (self.cursor + 1) % self.hosts.len();
        Some(host)
    }

    /// Returns hosts in list order.
    pub fn get(&self) -> &[u32] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Returns a new ordering of hosts sorted by free PEs ascending.
    ///
    /// Hosts with equal free PEs keep their list order. The rotation cursor is not affected.
    pub fn ordered_asc_by_free_pes(&self, ledger: &CapacityLedger) -> Vec<u32> {
        let mut hosts = self.hosts.clone();
        hosts.sort_by_key(|&host| ledger.free_pes(host));
        hosts
    }

    /// Returns the host with the fewest free PEs which still has at least `pes` free.
    pub fn with_minimum_free_pes(&self, pes: u32, ledger: &CapacityLedger) -> Option<u32> {
        self.ordered_asc_by_free_pes(ledger)
            .into_iter()
            .find(|&host| ledger.free_pes(host) >= pes)
    }
}
