//! Virtual machine placement algorithms.

use crate::core::capacity_ledger::CapacityLedger;
use crate::core::circular_host_list::CircularHostList;
use crate::core::config::{parse_config_value, ConfigError};
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithms::best_fit::BestFit;
use crate::core::vm_placement_algorithms::first_fit::FirstFit;
use crate::core::vm_placement_algorithms::rank_based::RankBased;
use crate::core::vm_placement_algorithms::round_robin::RoundRobin;
use crate::core::vm_placement_algorithms::worst_fit::WorstFit;

/// Trait for implementation of VM placement algorithms.
///
/// The algorithm receives the VM, the datacenter host list and the capacity ledger. It must either reserve
/// the VM PEs on exactly one host via [`CapacityLedger::reserve`] and return this host, or return `None`
/// leaving no reservation behind.
pub trait VmPlacementAlgorithm {
    fn allocate_host(
        &mut self,
        vm: &VirtualMachine,
        hosts: &mut CircularHostList,
        ledger: &mut CapacityLedger,
    ) -> Option<u32>;
}

/// Creates placement algorithm from its config string, e.g. `RoundRobin` or `WorstFit`.
pub fn placement_algorithm_resolver(config_str: &str) -> Result<Box<dyn VmPlacementAlgorithm>, ConfigError> {
    let (algorithm_name, _options) = parse_config_value(config_str);
    match algorithm_name.as_str() {
        "RoundRobin" => Ok(Box::new(RoundRobin::new())),
        "FirstFit" | "GreedyFirstFit" => Ok(Box::new(FirstFit::new())),
        "RankBased" => Ok(Box::new(RankBased::new())),
        "WorstFit" => Ok(Box::new(WorstFit::new())),
        "BestFit" => Ok(Box::new(BestFit::new())),
        _ => Err(ConfigError::UnknownAlgorithm(config_str.to_string())),
    }
}

/// Repeatedly picks a host with `select` among hosts not tried yet and tries to reserve the VM there,
/// giving up after each host has been tried once.
pub(crate) fn allocate_with_retries<F>(
    vm: &VirtualMachine,
    hosts: &CircularHostList,
    ledger: &mut CapacityLedger,
    mut select: F,
) -> Option<u32>
where
    F: FnMut(&[u32], &CapacityLedger) -> Option<u32>,
{
    let mut eligible: Vec<u32> = hosts.get().to_vec();
    for _ in 0..hosts.len() {
        let host = select(&eligible, ledger)?;
        if ledger.reserve(vm.id, host, vm.pes) {
            return Some(host);
        }
        eligible.retain(|&id| id != host);
    }
    None
}
