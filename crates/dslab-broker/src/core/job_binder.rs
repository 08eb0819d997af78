//! Binding of pending jobs to created VMs.

use std::collections::HashSet;

use indexmap::IndexMap;
use rand_pcg::Pcg64;
use serde::Serialize;

use crate::core::job::Job;
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;

/// Result of a single binding round.
#[derive(Serialize, Clone, Debug, Default)]
pub struct BindingPlan {
    /// Job ID -> VM ID for jobs bound to created VMs, in job submission order.
    pub bindings: IndexMap<u32, u32>,
    /// Jobs bound to a VM which is not created (or left unbound because no VM exists).
    pub postponed: Vec<u32>,
    /// Number of bound jobs per created VM, in the order of created VMs.
    pub vm_load: IndexMap<u32, usize>,
    /// Number of adjacent pending jobs (in submission order) bound to different VMs.
    pub transition_cost: usize,
}

impl BindingPlan {
    pub fn is_bound(&self, job_id: u32) -> bool {
        self.bindings.contains_key(&job_id)
    }
}

/// Applies the configured binding algorithm to pending jobs.
pub struct JobBinder {
    algorithm: Box<dyn JobBindingAlgorithm>,
    rounds: u32,
}

impl JobBinder {
    pub fn new(algorithm: Box<dyn JobBindingAlgorithm>) -> Self {
        Self { algorithm, rounds: 0 }
    }

    /// Replaces the binding algorithm.
    pub fn set_algorithm(&mut self, algorithm: Box<dyn JobBindingAlgorithm>) {
        self.algorithm = algorithm;
    }

    /// Returns the number of performed binding rounds.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Binds pending jobs to the created VMs and writes the selected VM to `vm_id` of every job.
    ///
    /// Pinned jobs keep their VM. Unpinned jobs are rebound from scratch in each round.
    /// Jobs whose VM is absent from `vms` are reported as postponed.
    /// Randomized algorithms draw only from `rand`.
    pub fn bind(&mut self, jobs: &mut [Job], vms: &[VirtualMachine], rand: &mut Pcg64) -> BindingPlan {
        self.rounds += 1;

        let free: Vec<usize> = (0..jobs.len()).filter(|&i| !jobs[i].pinned).collect();
        for &i in &free {
            jobs[i].vm_id = None;
        }
        if !vms.is_empty() && !free.is_empty() {
            let free_jobs: Vec<Job> = free.iter().map(|&i| jobs[i].clone()).collect();
            let selected = self.algorithm.bind_jobs(&free_jobs, vms, rand);
            assert_eq!(
                selected.len(),
                free_jobs.len(),
                "binding algorithm must select a VM for every job"
            );
            for (&i, vm_id) in free.iter().zip(selected) {
                jobs[i].vm_id = Some(vm_id);
            }
        }

        let created: HashSet<u32> = vms.iter().map(|vm| vm.id).collect();
        let mut plan = BindingPlan {
            vm_load: vms.iter().map(|vm| (vm.id, 0)).collect(),
            ..Default::default()
        };
        for job in jobs.iter() {
            match job.vm_id {
                Some(vm_id) if created.contains(&vm_id) => {
                    plan.bindings.insert(job.id, vm_id);
                    *plan.vm_load.entry(vm_id).or_insert(0) += 1;
                }
                _ => plan.postponed.push(job.id),
            }
        }
        plan.transition_cost = transition_cost(jobs);
        plan
    }
}

/// Counts adjacent jobs bound to different VMs.
pub fn transition_cost(jobs: &[Job]) -> usize {
    jobs.windows(2).filter(|pair| pair[0].vm_id != pair[1].vm_id).count()
}
