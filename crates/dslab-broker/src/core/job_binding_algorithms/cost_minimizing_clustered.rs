//! Cost minimizing clustered binding.

use crate::core::job_binding_algorithms::clustering::{
    cluster_lengths, cluster_sizes, cost_matrix, expand_clusters, min_cost_with_feedback, ClusterSizing,
};
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Splits jobs into contiguous clusters and binds each cluster to the VM with the minimal accumulated cost.
///
/// The cost of running cluster `c` on VM `r` is `cluster_length[c] / mips[r]`. Once a cluster is bound,
/// its cost is added to the same VM column of the other clusters, which discourages reusing loaded VMs.
pub struct CostMinimizingClustered {
    sizing: ClusterSizing,
}

impl CostMinimizingClustered {
    pub fn new(sizing: ClusterSizing) -> Self {
        Self { sizing }
    }
}

impl JobBindingAlgorithm for CostMinimizingClustered {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> Vec<u32> {
        let sizes = cluster_sizes(jobs.len(), self.sizing, rand);
        let costs = cost_matrix(&cluster_lengths(jobs, &sizes), vms);
        let cluster_vms = min_cost_with_feedback(&costs);
        expand_clusters(&sizes, &cluster_vms, vms)
    }
}
