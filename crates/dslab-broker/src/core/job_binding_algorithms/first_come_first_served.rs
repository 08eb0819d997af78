//! First Come First Served binding.

use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Splits the job list into `J / N` sized contiguous blocks, one block per VM in list order.
///
/// Jobs left after `N` full blocks (all jobs if there are fewer jobs than VMs) are bound round-robin
/// starting from the first VM.
#[derive(Default)]
pub struct FirstComeFirstServed;

impl FirstComeFirstServed {
    pub fn new() -> Self {
        Default::default()
    }
}

impl JobBindingAlgorithm for FirstComeFirstServed {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], _rand: &mut Pcg64) -> Vec<u32> {
        let block = jobs.len() / vms.len();
        let blocked = block * vms.len();
        (0..jobs.len())
            .map(|i| {
                if i < blocked {
                    vms[i / block].id
                } else {
                    vms[(i - blocked) % vms.len()].id
                }
            })
            .collect()
    }
}
