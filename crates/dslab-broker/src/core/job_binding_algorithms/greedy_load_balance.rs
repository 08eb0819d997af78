//! Greedy load balancing binding.

use crate::core::job_binding_algorithms::clustering::argmin;
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Binds each job to the VM with the minimal predicted finish time, then increases this time
/// by the job execution estimate `length / mips`.
///
/// Predicted times start from the baseline (zero for VMs missing in it).
pub struct GreedyLoadBalance {
    baseline: Option<Vec<f64>>,
}

impl GreedyLoadBalance {
    pub fn new(baseline: Option<Vec<f64>>) -> Self {
        Self { baseline }
    }
}

/// Returns initial predicted finish times for the VMs.
pub(crate) fn initial_times(baseline: &Option<Vec<f64>>, vm_count: usize) -> Vec<f64> {
    (0..vm_count)
        .map(|i| baseline.as_ref().and_then(|times| times.get(i).copied()).unwrap_or(0.))
        .collect()
}

impl JobBindingAlgorithm for GreedyLoadBalance {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], _rand: &mut Pcg64) -> Vec<u32> {
        let mut times = initial_times(&self.baseline, vms.len());
        jobs.iter()
            .map(|job| {
                let index = argmin(&times);
                times[index] += vms[index].estimate_time(job.length);
                vms[index].id
            })
            .collect()
    }
}
