//! Saturation Fill binding.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Saturates a single target VM with the first `count` jobs, the remaining jobs go to random VMs.
pub struct SaturationFill {
    count: usize,
    target: u32,
}

impl SaturationFill {
    pub fn new(count: usize, target: u32) -> Self {
        Self { count, target }
    }
}

impl JobBindingAlgorithm for SaturationFill {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> Vec<u32> {
        (0..jobs.len())
            .map(|i| {
                if i < self.count {
                    self.target
                } else {
                    vms[rand.gen_range(0..vms.len())].id
                }
            })
            .collect()
    }
}
