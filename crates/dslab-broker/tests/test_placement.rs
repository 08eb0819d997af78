use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use dslab_broker::core::host::PhysicalHost;
use dslab_broker::core::vm::VirtualMachine;
use dslab_broker::core::vm_allocation_policy::VmAllocationPolicy;
use dslab_broker::core::vm_placement_algorithm::placement_algorithm_resolver;

const ALGORITHMS: [&str; 5] = ["RoundRobin", "FirstFit", "RankBased", "WorstFit", "BestFit"];

fn hosts(pes: &[u32]) -> Vec<PhysicalHost> {
    pes.iter()
        .enumerate()
        .map(|(i, &pes)| PhysicalHost::new(i as u32, &format!("h{}", i), pes, 1000.))
        .collect()
}

fn policy(algorithm: &str, hosts: Vec<PhysicalHost>) -> VmAllocationPolicy {
    VmAllocationPolicy::new(hosts, placement_algorithm_resolver(algorithm).unwrap())
}

fn vm(id: u32, pes: u32) -> VirtualMachine {
    VirtualMachine::new(id, pes, 100.)
}

#[test]
// Each of N uniform hosts is visited exactly once before the rotation repeats.
fn test_round_robin_visits_each_host_once() {
    let mut policy = policy("RoundRobin", hosts(&[4, 4, 4, 4]));
    let placed: Vec<Option<u32>> = (0..5).map(|i| policy.place(&vm(i, 1))).collect();
    assert_eq!(placed, vec![Some(0), Some(1), Some(2), Some(3), Some(0)]);
}

#[test]
fn test_round_robin_skips_full_host() {
    let mut policy = policy("RoundRobin", hosts(&[1, 4]));
    assert_eq!(policy.place(&vm(0, 1)), Some(0));
    assert_eq!(policy.place(&vm(1, 1)), Some(1));
    assert_eq!(policy.place(&vm(2, 1)), Some(1));
    assert_eq!(policy.ledger().free_pes(0), 0);
    assert_eq!(policy.ledger().free_pes(1), 2);
}

#[test]
fn test_first_fit() {
    let mut policy = policy("FirstFit", hosts(&[2, 4, 4]));
    assert_eq!(policy.place(&vm(0, 3)), Some(1));
    assert_eq!(policy.place(&vm(1, 2)), Some(0));
    assert_eq!(policy.place(&vm(2, 2)), Some(2));
    assert_eq!(policy.place(&vm(3, 5)), None);
}

#[test]
fn test_greedy_first_fit_alias() {
    let mut policy = policy("GreedyFirstFit", hosts(&[1, 1]));
    assert_eq!(policy.place(&vm(0, 1)), Some(0));
    assert_eq!(policy.place(&vm(1, 1)), Some(1));
}

#[test]
// The host with the largest free capacity in MIPS is used, a host which can't fit the VM is skipped.
fn test_rank_based() {
    let hosts = vec![
        PhysicalHost::new(0, "slow", 4, 100.),
        PhysicalHost::new(1, "fast", 2, 1000.),
    ];
    let mut policy = policy("RankBased", hosts);
    assert_eq!(policy.place(&vm(0, 3)), Some(0));
    assert_eq!(policy.place(&vm(1, 1)), Some(1));
    assert_eq!(policy.place(&vm(2, 1)), Some(1));
    assert_eq!(policy.place(&vm(3, 1)), Some(0));
    assert_eq!(policy.place(&vm(4, 1)), None);
}

#[test]
fn test_rank_based_tie_prefers_first_host() {
    let mut policy = policy("RankBased", hosts(&[2, 2]));
    assert_eq!(policy.place(&vm(0, 1)), Some(0));
    assert_eq!(policy.place(&vm(1, 1)), Some(1));
}

#[test]
// The host with the fewest used PEs is selected, recomputed on every call.
fn test_worst_fit() {
    let mut policy = policy("WorstFit", hosts(&[8, 4]));
    assert_eq!(policy.place(&vm(0, 2)), Some(0));
    assert_eq!(policy.place(&vm(1, 2)), Some(1));
    assert_eq!(policy.place(&vm(2, 2)), Some(0));
    // host 1 has fewer used pes but can't fit the VM
    assert_eq!(policy.place(&vm(3, 3)), Some(0));
}

#[test]
fn test_best_fit() {
    let mut policy = policy("BestFit", hosts(&[4, 2, 8]));
    assert_eq!(policy.place(&vm(0, 2)), Some(1));
    assert_eq!(policy.place(&vm(1, 3)), Some(0));
    assert_eq!(policy.place(&vm(2, 8)), Some(2));
    assert_eq!(policy.place(&vm(3, 1)), Some(0));
    assert_eq!(policy.place(&vm(4, 1)), None);
}

#[test]
fn test_already_placed_vm_keeps_host() {
    for algorithm in ALGORITHMS {
        let mut policy = policy(algorithm, hosts(&[4, 4]));
        let host = policy.place(&vm(0, 2));
        assert!(host.is_some());
        assert_eq!(policy.place(&vm(0, 2)), host, "{}", algorithm);
        assert_eq!(policy.ledger().total_free_pes(), 6, "{}", algorithm);
    }
}

#[test]
fn test_failed_placement_leaves_ledger_untouched() {
    for algorithm in ALGORITHMS {
        let mut policy = policy(algorithm, hosts(&[2, 3, 1]));
        assert_eq!(policy.place(&vm(0, 4)), None, "{}", algorithm);
        assert_eq!(policy.host_of(0), None);
        assert_eq!(policy.ledger().total_free_pes(), 6);
        assert!(policy.ledger().is_consistent());
    }
}

#[test]
fn test_deallocate() {
    let mut policy = policy("FirstFit", hosts(&[4]));
    policy.place(&vm(0, 3));
    let allocation = policy.deallocate(0).unwrap();
    assert_eq!((allocation.vm_id, allocation.host_id, allocation.pes), (0, 0, 3));
    assert_eq!(policy.ledger().free_pes(0), 4);
    assert!(policy.deallocate(0).is_none());
    assert!(policy.deallocate(42).is_none());
    assert_eq!(policy.ledger().free_pes(0), 4);
}

#[test]
fn test_added_host_is_used() {
    let mut policy = policy("FirstFit", hosts(&[1]));
    assert_eq!(policy.place(&vm(0, 2)), None);
    policy.add_host(PhysicalHost::new(1, "h1", 2, 1000.));
    assert_eq!(policy.place(&vm(0, 2)), Some(1));
}

#[test]
// Random sequences of placements and releases keep free = total - reserved on every host.
fn test_ledger_stays_consistent() {
    let mut rand = Pcg64::seed_from_u64(42);
    for algorithm in ALGORITHMS {
        let mut policy = policy(algorithm, hosts(&[4, 8, 2, 6]));
        let mut placed = Vec::new();
        for vm_id in 0..300 {
            if !placed.is_empty() && rand.gen_bool(0.4) {
                let index = rand.gen_range(0..placed.len());
                let vm_id: u32 = placed.swap_remove(index);
                assert!(policy.deallocate(vm_id).is_some());
            } else if policy.place(&vm(vm_id, rand.gen_range(1..=5))).is_some() {
                placed.push(vm_id);
            }
            assert!(policy.ledger().is_consistent(), "{}", algorithm);
        }
        let used: u32 = placed
            .iter()
            .map(|&vm_id| policy.ledger().allocation(vm_id).unwrap().pes)
            .sum();
        assert_eq!(policy.ledger().total_free_pes() + used, 20);
    }
}

#[test]
fn test_unknown_algorithm() {
    assert!(placement_algorithm_resolver("Magic").is_err());
}
