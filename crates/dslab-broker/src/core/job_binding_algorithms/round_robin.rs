//! Round Robin binding.

use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Binds the i-th job to the VM `i mod N` in the list of created VMs.
#[derive(Default)]
pub struct RoundRobinBinding;

impl RoundRobinBinding {
    pub fn new() -> Self {
        Default::default()
    }
}

impl JobBindingAlgorithm for RoundRobinBinding {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], _rand: &mut Pcg64) -> Vec<u32> {
        (0..jobs.len()).map(|i| vms[i % vms.len()].id).collect()
    }
}
