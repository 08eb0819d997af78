//! Random binding.

use rand::Rng;
use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Binds each job to a VM chosen uniformly at random.
#[derive(Default)]
pub struct RandomBinding;

impl RandomBinding {
    pub fn new() -> Self {
        Default::default()
    }
}

impl JobBindingAlgorithm for RandomBinding {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> Vec<u32> {
        jobs.iter().map(|_| vms[rand.gen_range(0..vms.len())].id).collect()
    }
}
