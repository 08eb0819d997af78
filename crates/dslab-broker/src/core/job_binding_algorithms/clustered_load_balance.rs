//! Clustered greedy load balancing binding.

use crate::core::job_binding_algorithms::clustering::{argmin, cluster_sizes, ClusterSizing};
use crate::core::job_binding_algorithms::greedy_load_balance::initial_times;
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Splits jobs into random contiguous clusters, binds each cluster to the VM with the minimal predicted
/// finish time and adds execution estimates of all cluster jobs to this VM.
pub struct ClusteredLoadBalance {
    min_size: usize,
    max_size: usize,
    baseline: Option<Vec<f64>>,
}

impl ClusteredLoadBalance {
    pub fn new(min_size: usize, max_size: usize, baseline: Option<Vec<f64>>) -> Self {
        Self {
            min_size,
            max_size,
            baseline,
        }
    }
}

impl JobBindingAlgorithm for ClusteredLoadBalance {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> Vec<u32> {
        let sizing = ClusterSizing::Random {
            min: self.min_size,
            max: self.max_size,
        };
        let mut times = initial_times(&self.baseline, vms.len());
        let mut result = Vec::with_capacity(jobs.len());
        let mut offset = 0;
        for size in cluster_sizes(jobs.len(), sizing, rand) {
            let index = argmin(&times);
            for job in &jobs[offset..offset + size] {
                times[index] += vms[index].estimate_time(job.length);
                result.push(vms[index].id);
            }
            offset += size;
        }
        result
    }
}
