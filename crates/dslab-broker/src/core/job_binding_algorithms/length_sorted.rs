//! Min-Min and Max-Min binding.

use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::job_binding_algorithms::clustering::{cost_matrix, min_cost_with_feedback};
use crate::core::vm::VirtualMachine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthOrder {
    /// Shortest jobs are bound first (Min-Min).
    Ascending,
    /// Longest jobs are bound first (Max-Min).
    Descending,
}

/// Orders jobs by length and binds each one to the VM with the minimal accumulated cost,
/// using the same cost feedback as [`CostMinimizingClustered`](super::cost_minimizing_clustered::CostMinimizingClustered)
/// with single-job rows.
///
/// Jobs of equal length are ordered by ID, so the result does not depend on the input order.
pub struct LengthSorted {
    order: LengthOrder,
}

impl LengthSorted {
    pub fn new(order: LengthOrder) -> Self {
        Self { order }
    }
}

impl JobBindingAlgorithm for LengthSorted {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], _rand: &mut Pcg64) -> Vec<u32> {
        let mut order: Vec<usize> = (0..jobs.len()).collect();
        match self.order {
            LengthOrder::Ascending => order.sort_by_key(|&i| (jobs[i].length, jobs[i].id)),
            LengthOrder::Descending => {
                order.sort_by_key(|&i| (std::cmp::Reverse(jobs[i].length), jobs[i].id))
            }
        }
        let lengths: Vec<u64> = order.iter().map(|&i| jobs[i].length).collect();
        let selected = min_cost_with_feedback(&cost_matrix(&lengths, vms));

        let mut result = vec![0; jobs.len()];
        for (&job_index, &vm_index) in order.iter().zip(selected.iter()) {
            result[job_index] = vms[vm_index].id;
        }
        result
    }
}
