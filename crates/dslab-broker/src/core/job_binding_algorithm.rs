//! Job to VM binding algorithms.

use rand_pcg::Pcg64;

use crate::core::config::{option_or, parse_config_value, parse_options, required_option, ConfigError};
use crate::core::job::Job;
use crate::core::job_binding_algorithms::clustered_load_balance::ClusteredLoadBalance;
use crate::core::job_binding_algorithms::clustering::ClusterSizing;
use crate::core::job_binding_algorithms::cost_minimizing_clustered::CostMinimizingClustered;
use crate::core::job_binding_algorithms::first_come_first_served::FirstComeFirstServed;
use crate::core::job_binding_algorithms::greedy_load_balance::GreedyLoadBalance;
use crate::core::job_binding_algorithms::length_sorted::{LengthOrder, LengthSorted};
use crate::core::job_binding_algorithms::length_sorted_round_robin::LengthSortedRoundRobin;
use crate::core::job_binding_algorithms::random::RandomBinding;
use crate::core::job_binding_algorithms::random_clustered::RandomClustered;
use crate::core::job_binding_algorithms::round_robin::RoundRobinBinding;
use crate::core::job_binding_algorithms::saturation_fill::SaturationFill;
use crate::core::vm::VirtualMachine;

/// Trait for implementation of job binding algorithms.
///
/// The algorithm receives the jobs to bind in submission order and the non-empty list of created VMs,
/// and returns the ID of the selected VM for each job (in the same order). Randomized algorithms must draw
/// only from the passed generator so that the result is reproducible for a given seed.
///
/// The returned VM may be absent from `vms` (e.g. a configured saturation target which was not created),
/// such jobs are postponed by the caller.
pub trait JobBindingAlgorithm {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> Vec<u32>;
}

/// Creates binding algorithm from its config string, e.g. `SaturationFill[count=1000,target=4]`.
pub fn binding_algorithm_resolver(config_str: &str) -> Result<Box<dyn JobBindingAlgorithm>, ConfigError> {
    let (algorithm_name, options_str) = parse_config_value(config_str);
    let options = parse_options(options_str.as_deref().unwrap_or(""));
    let algorithm: Box<dyn JobBindingAlgorithm> = match algorithm_name.as_str() {
        "RoundRobin" => Box::new(RoundRobinBinding::new()),
        "Random" => Box::new(RandomBinding::new()),
        "SaturationFill" => Box::new(SaturationFill::new(
            option_or(&options, "count", 1000)?,
            option_or(&options, "target", 0)?,
        )),
        "FirstComeFirstServed" | "FCFS" => Box::new(FirstComeFirstServed::new()),
        "GreedyLoadBalance" => Box::new(GreedyLoadBalance::new(parse_baseline(&options)?)),
        "RandomClustered" => Box::new(RandomClustered::new(
            option_or(&options, "min", 1)?,
            option_or(&options, "max", 100)?,
        )),
        "CostMinimizingClustered" => {
            let sizing = match options.get("size") {
                Some(_) => ClusterSizing::Fixed(required_option(&options, "size")?),
                None => ClusterSizing::Random {
                    min: option_or(&options, "min", 1)?,
                    max: option_or(&options, "max", 100)?,
                },
            };
            Box::new(CostMinimizingClustered::new(sizing))
        }
        "ClusteredLoadBalance" => Box::new(ClusteredLoadBalance::new(
            option_or(&options, "min", 1)?,
            option_or(&options, "max", 100)?,
            parse_baseline(&options)?,
        )),
        "MinMin" => Box::new(LengthSorted::new(LengthOrder::Ascending)),
        "MaxMin" => Box::new(LengthSorted::new(LengthOrder::Descending)),
        "Priority" => Box::new(LengthSortedRoundRobin::priority()),
        "Modified" => Box::new(LengthSortedRoundRobin::modified()),
        _ => return Err(ConfigError::UnknownAlgorithm(config_str.to_string())),
    };
    Ok(algorithm)
}

/// Parses `baseline=a;b;c` option into predicted finish times of VMs.
fn parse_baseline(options: &std::collections::HashMap<String, String>) -> Result<Option<Vec<f64>>, ConfigError> {
    match options.get("baseline") {
        None => Ok(None),
        Some(value) => value
            .split(';')
            .map(|item| {
                item.trim().parse::<f64>().map_err(|_| ConfigError::InvalidOption {
                    option: "baseline".to_string(),
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<f64>, ConfigError>>()
            .map(Some),
    }
}
