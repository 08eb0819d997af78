//! Helpers shared by cluster-based and cost-matrix binding algorithms.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::vm::VirtualMachine;

/// How the job stream is split into contiguous clusters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterSizing {
    /// Each cluster size is sampled uniformly from `[min, max]`, the last cluster is truncated.
    Random { min: usize, max: usize },
    /// All clusters have the same size except possibly the last, smaller one.
    Fixed(usize),
}

/// Splits `total` jobs into contiguous cluster sizes which sum up to `total` exactly.
pub fn cluster_sizes(total: usize, sizing: ClusterSizing, rand: &mut Pcg64) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut assigned = 0;
    while assigned < total {
        let size = match sizing {
            ClusterSizing::Random { min, max } => {
                let min = min.max(1);
                rand.gen_range(min..=max.max(min))
            }
            ClusterSizing::Fixed(size) => size.max(1),
        };
        let size = size.min(total - assigned);
        sizes.push(size);
        assigned += size;
    }
    sizes
}

/// Returns the index of the first minimal value.
pub fn argmin(values: &[f64]) -> usize {
    let mut index = 0;
    for (i, &value) in values.iter().enumerate() {
        if value < values[index] {
            index = i;
        }
    }
    index
}

/// Builds `length / mips` cost matrix for the given row lengths (rows) and VMs (columns).
pub fn cost_matrix(lengths: &[u64], vms: &[VirtualMachine]) -> Vec<Vec<f64>> {
    lengths
        .iter()
        .map(|&length| vms.iter().map(|vm| vm.estimate_time(length)).collect())
        .collect()
}

/// Greedily selects a column for each row of the cost matrix in row order.
///
/// After row `i` selects column `j`, its original cost `costs[i][j]` is added to column `j` of every other row,
/// so later rows see the accumulated load of VM `j`. Only rows after `i` are affected in practice,
/// which allows keeping a single penalty per column.
pub fn min_cost_with_feedback(costs: &[Vec<f64>]) -> Vec<usize> {
    let cols = costs.first().map_or(0, |row| row.len());
    let mut penalty = vec![0.; cols];
    let mut result = Vec::with_capacity(costs.len());
    for row in costs {
        let current: Vec<f64> = row.iter().zip(penalty.iter()).map(|(cost, p)| cost + p).collect();
        let index = argmin(&current);
        penalty[index] += row[index];
        result.push(index);
    }
    result
}

/// Returns the total length of jobs in each contiguous cluster.
pub fn cluster_lengths(jobs: &[Job], sizes: &[usize]) -> Vec<u64> {
    let mut offset = 0;
    sizes
        .iter()
        .map(|&size| {
            let length = jobs[offset..offset + size].iter().map(|job| job.length).sum();
            offset += size;
            length
        })
        .collect()
}

/// Expands per-cluster VM indices into per-job VM IDs.
pub fn expand_clusters(sizes: &[usize], cluster_vms: &[usize], vms: &[VirtualMachine]) -> Vec<u32> {
    sizes
        .iter()
        .zip(cluster_vms.iter())
        .flat_map(|(&size, &vm_index)| std::iter::repeat(vms[vm_index].id).take(size))
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn random_clusters_exhaust_job_count() {
        let mut rand = Pcg64::seed_from_u64(7);
        for total in [0, 1, 5, 99, 100, 101, 5000] {
            let sizes = cluster_sizes(total, ClusterSizing::Random { min: 1, max: 100 }, &mut rand);
            assert_eq!(sizes.iter().sum::<usize>(), total);
            assert!(sizes.iter().all(|&size| (1..=100).contains(&size)));
        }
    }

    #[test]
    fn fixed_clusters_keep_remainder() {
        let mut rand = Pcg64::seed_from_u64(7);
        assert_eq!(cluster_sizes(10, ClusterSizing::Fixed(4), &mut rand), vec![4, 4, 2]);
    }

    #[test]
    fn feedback_spreads_equal_rows() {
        let costs = vec![vec![1., 2.], vec![1., 2.], vec![1., 2.]];
        // row 0 -> col 0 (1 vs 2), row 1 sees [2, 2] -> col 0, row 2 sees [3, 2] -> col 1
        assert_eq!(min_cost_with_feedback(&costs), vec![0, 0, 1]);
    }
}
