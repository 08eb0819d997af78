//! Random clustered binding.

use crate::core::job_binding_algorithms::clustering::{cluster_sizes, expand_clusters, ClusterSizing};
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Splits jobs into contiguous clusters of random size and binds clusters to VMs round-robin.
pub struct RandomClustered {
    min_size: usize,
    max_size: usize,
}

impl RandomClustered {
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self { min_size, max_size }
    }
}

impl JobBindingAlgorithm for RandomClustered {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> Vec<u32> {
        let sizing = ClusterSizing::Random {
            min: self.min_size,
            max: self.max_size,
        };
        let sizes = cluster_sizes(jobs.len(), sizing, rand);
        let cluster_vms: Vec<usize> = (0..sizes.len()).map(|c| c % vms.len()).collect();
        expand_clusters(&sizes, &cluster_vms, vms)
    }
}
