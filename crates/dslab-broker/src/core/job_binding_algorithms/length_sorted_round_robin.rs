//! Priority and Modified binding: round robin over jobs sorted by length.

use rand_pcg::Pcg64;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Sorts jobs by length (shortest first) and binds them round robin, so that the i-th shortest job
/// goes to the VM `i mod N`.
///
/// With `sort_vms` the VMs are also ordered by their total capacity (`mips * pes`, smallest first)
/// before the rotation. Ties in both orderings are broken by ID.
pub struct LengthSortedRoundRobin {
    sort_vms: bool,
}

impl LengthSortedRoundRobin {
    /// Jobs sorted, VMs in creation order.
    pub fn priority() -> Self {
        Self { sort_vms: false }
    }

    /// Both jobs and VMs sorted.
    pub fn modified() -> Self {
        Self { sort_vms: true }
    }
}

impl JobBindingAlgorithm for LengthSortedRoundRobin {
    fn bind_jobs(&mut self, jobs: &[Job], vms: &[VirtualMachine], _rand: &mut Pcg64) -> Vec<u32> {
        let mut job_order: Vec<usize> = (0..jobs.len()).collect();
        job_order.sort_by_key(|&i| (jobs[i].length, jobs[i].id));

        let mut vm_order: Vec<&VirtualMachine> = vms.iter().collect();
        if self.sort_vms {
            vm_order.sort_by(|a, b| {
                (a.mips * a.pes as f64)
                    .total_cmp(&(b.mips * b.pes as f64))
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        let mut result = vec![0; jobs.len()];
        for (rank, &job_index) in job_order.iter().enumerate() {
            result[job_index] = vm_order[rank % vm_order.len()].id;
        }
        result
    }
}
