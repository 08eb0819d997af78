use std::collections::HashMap;

use rand::SeedableRng;
use rand_pcg::Pcg64;

use dslab_broker::core::config::ConfigError;
use dslab_broker::core::job::Job;
use dslab_broker::core::job_binder::JobBinder;
use dslab_broker::core::job_binding_algorithm::binding_algorithm_resolver;
use dslab_broker::core::vm::VirtualMachine;

fn jobs(lengths: &[u64]) -> Vec<Job> {
    lengths
        .iter()
        .enumerate()
        .map(|(i, &length)| Job::new(i as u32, length, 1))
        .collect()
}

fn vms(mips: &[f64]) -> Vec<VirtualMachine> {
    mips.iter()
        .enumerate()
        .map(|(i, &mips)| VirtualMachine::new(i as u32, 1, mips))
        .collect()
}

fn bind(algorithm: &str, jobs: &[Job], vms: &[VirtualMachine]) -> Vec<u32> {
    let mut rand = Pcg64::seed_from_u64(123);
    binding_algorithm_resolver(algorithm)
        .unwrap()
        .bind_jobs(jobs, vms, &mut rand)
}

#[test]
fn test_round_robin() {
    assert_eq!(bind("RoundRobin", &jobs(&[1; 5]), &vms(&[100., 100.])), vec![0, 1, 0, 1, 0]);
}

#[test]
fn test_random_is_reproducible() {
    let jobs = jobs(&[1; 50]);
    let vms = vms(&[100.; 4]);
    let first = bind("Random", &jobs, &vms);
    assert_eq!(first, bind("Random", &jobs, &vms));
    assert!(first.iter().all(|&vm| vm < 4));
}

#[test]
// The first k jobs go to the target VM, the rest to random VMs.
fn test_saturation_fill() {
    let result = bind("SaturationFill[count=3,target=0]", &jobs(&[1; 5]), &vms(&[100., 100.]));
    assert_eq!(&result[..3], &[0, 0, 0]);
    assert!(result[3..].iter().all(|vm| [0, 1].contains(vm)));
}

#[test]
fn test_first_come_first_served() {
    let vms = vms(&[100.; 3]);
    assert_eq!(bind("FCFS", &jobs(&[1; 7]), &vms), vec![0, 0, 1, 1, 2, 2, 0]);
    assert_eq!(bind("FirstComeFirstServed", &jobs(&[1; 6]), &vms), vec![0, 0, 1, 1, 2, 2]);
    // fewer jobs than VMs
    assert_eq!(bind("FCFS", &jobs(&[1; 2]), &vms), vec![0, 1]);
}

#[test]
fn test_greedy_load_balance_alternates() {
    let result = bind("GreedyLoadBalance", &jobs(&[10, 10, 10]), &vms(&[100., 100.]));
    assert_eq!(result, vec![0, 1, 0]);
}

#[test]
fn test_greedy_load_balance_baseline() {
    let vms = vms(&[100., 100.]);
    let result = bind("GreedyLoadBalance[baseline=0.5;0]", &jobs(&[10, 10, 10]), &vms);
    assert_eq!(result, vec![1, 1, 1]);
    // missing baseline entries are zero
    let result = bind("GreedyLoadBalance[baseline=0.15]", &jobs(&[10, 10, 10]), &vms);
    assert_eq!(result, vec![1, 1, 0]);
}

#[test]
fn test_greedy_load_balance_prefers_fast_vm() {
    let result = bind("GreedyLoadBalance", &jobs(&[100; 4]), &vms(&[100., 300.]));
    // predicted times: vm1 gets 1/3, 2/3, 1 while vm0 gets 1
    assert_eq!(result, vec![0, 1, 1, 1]);
}

#[test]
fn test_random_clustered() {
    let result = bind("RandomClustered[min=2,max=2]", &jobs(&[1; 5]), &vms(&[100.; 3]));
    assert_eq!(result, vec![0, 0, 1, 1, 2]);

    let result = bind("RandomClustered", &jobs(&[1; 500]), &vms(&[100.; 3]));
    assert_eq!(result.len(), 500);
    assert!(result.iter().all(|&vm| vm < 3));
}

#[test]
// Cluster costs are added to the chosen VM column of the following clusters.
fn test_cost_minimizing_clustered() {
    let result = bind(
        "CostMinimizingClustered[size=2]",
        &jobs(&[100; 5]),
        &vms(&[100., 100.]),
    );
    assert_eq!(result, vec![0, 0, 1, 1, 0]);

    let result = bind("CostMinimizingClustered[min=1,max=10]", &jobs(&[100; 50]), &vms(&[100.; 4]));
    assert_eq!(result.len(), 50);
}

#[test]
fn test_clustered_load_balance() {
    let result = bind(
        "ClusteredLoadBalance[min=1,max=1]",
        &jobs(&[10, 10, 10]),
        &vms(&[100., 100.]),
    );
    assert_eq!(result, vec![0, 1, 0]);
}

#[test]
fn test_min_min() {
    let result = bind("MinMin", &jobs(&[300, 100, 200]), &vms(&[100., 200.]));
    assert_eq!(result, vec![0, 1, 1]);
}

#[test]
fn test_max_min() {
    let result = bind("MaxMin", &jobs(&[300, 100, 200]), &vms(&[100., 200.]));
    assert_eq!(result, vec![1, 1, 0]);
}

#[test]
// Jobs sorted by length are dealt over the VMs in creation order.
fn test_priority() {
    let result = bind("Priority", &jobs(&[500, 100, 300, 200, 100]), &vms(&[100., 50., 200.]));
    // order by length: 1, 4, 3, 2, 0
    assert_eq!(result, vec![1, 0, 0, 2, 1]);
}

#[test]
// VMs are dealt from the smallest total capacity.
fn test_modified() {
    let vms = vec![
        VirtualMachine::new(0, 1, 100.),
        VirtualMachine::new(1, 1, 50.),
        VirtualMachine::new(2, 2, 50.),
    ];
    let result = bind("Modified", &jobs(&[500, 100, 300, 200, 100]), &vms);
    // vm order by capacity: 1 (50), 0 (100, lower id), 2 (100)
    assert_eq!(result, vec![0, 1, 1, 2, 0]);
}

#[test]
// Sorting is internal, so reordering the input does not change the binding map.
fn test_min_min_is_idempotent() {
    let vms = vms(&[100., 250., 400.]);
    let jobs = jobs(&[700, 100, 500, 100, 900, 300]);
    let to_map = |jobs: &[Job], result: Vec<u32>| -> HashMap<u32, u32> {
        jobs.iter().map(|job| job.id).zip(result).collect()
    };
    let first = to_map(&jobs, bind("MinMin", &jobs, &vms));
    let second = to_map(&jobs, bind("MinMin", &jobs, &vms));
    assert_eq!(first, second);

    let mut reversed = jobs.clone();
    reversed.reverse();
    let third = to_map(&reversed, bind("MinMin", &reversed, &vms));
    assert_eq!(first, third);
}

#[test]
// Pinned jobs keep their VM and jobs bound to missing VMs are postponed.
fn test_binder_postpones_missing_vms() {
    let vms = vms(&[100., 100.]);
    let mut jobs = jobs(&[1; 5]);
    jobs[2].pin_to(5);
    let mut binder = JobBinder::new(binding_algorithm_resolver("RoundRobin").unwrap());
    let plan = binder.bind(&mut jobs, &vms, &mut Pcg64::seed_from_u64(1));

    assert_eq!(plan.bindings.get(&0), Some(&0));
    assert_eq!(plan.bindings.get(&1), Some(&1));
    assert_eq!(plan.bindings.get(&3), Some(&0));
    assert_eq!(plan.bindings.get(&4), Some(&1));
    assert!(!plan.is_bound(2));
    assert_eq!(plan.postponed, vec![2]);
    assert_eq!(jobs[2].vm_id, Some(5));
    assert_eq!(plan.vm_load.get(&0), Some(&2));
    assert_eq!(plan.vm_load.get(&1), Some(&2));
    assert_eq!(plan.transition_cost, 4);
    assert_eq!(binder.rounds(), 1);
}

#[test]
fn test_binder_reports_uncreated_target() {
    let vms = vms(&[100., 100.]);
    let mut jobs = jobs(&[1; 4]);
    let mut binder = JobBinder::new(binding_algorithm_resolver("SaturationFill[count=2,target=7]").unwrap());
    let plan = binder.bind(&mut jobs, &vms, &mut Pcg64::seed_from_u64(1));
    assert_eq!(plan.postponed, vec![0, 1]);
    assert_eq!(plan.bindings.len(), 2);
    assert!(plan.bindings.values().all(|vm| *vm < 2));
}

#[test]
fn test_binder_without_vms() {
    let mut jobs = jobs(&[1; 3]);
    let mut binder = JobBinder::new(binding_algorithm_resolver("RoundRobin").unwrap());
    let plan = binder.bind(&mut jobs, &[], &mut Pcg64::seed_from_u64(1));
    assert_eq!(plan.postponed, vec![0, 1, 2]);
    assert!(plan.bindings.is_empty());
    assert_eq!(plan.transition_cost, 0);
}

#[test]
fn test_binder_transition_cost() {
    let vms = vms(&[100., 100.]);
    let mut jobs = jobs(&[1; 6]);
    let mut binder = JobBinder::new(binding_algorithm_resolver("FCFS").unwrap());
    let plan = binder.bind(&mut jobs, &vms, &mut Pcg64::seed_from_u64(1));
    assert_eq!(plan.transition_cost, 1);
}

#[test]
fn test_resolver_errors() {
    assert!(matches!(
        binding_algorithm_resolver("Magic"),
        Err(ConfigError::UnknownAlgorithm(_))
    ));
    assert!(matches!(
        binding_algorithm_resolver("SaturationFill[count=many]"),
        Err(ConfigError::InvalidOption { .. })
    ));
    assert!(matches!(
        binding_algorithm_resolver("GreedyLoadBalance[baseline=1;x]"),
        Err(ConfigError::InvalidOption { .. })
    ));
    assert!(binding_algorithm_resolver("MaxMin").is_ok());
}
