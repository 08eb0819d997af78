//! Resource provider which places VMs onto its hosts and executes submitted jobs.

use std::collections::HashMap;

use crate::core::common::DatacenterCharacteristics;
use crate::core::events::CloudEvent;
use crate::core::host::PhysicalHost;
use crate::core::job::{Job, JobStatus};
use crate::core::vm::VirtualMachine;
use crate::core::vm_allocation_policy::VmAllocationPolicy;
use crate::core::vm_placement_algorithm::VmPlacementAlgorithm;
use crate::kernel::log::log_unhandled_event;
use crate::kernel::{Event, EventHandler, Id, SimulationContext};
use crate::{log_debug, log_error, log_info, log_warn};

/// Datacenter answers broker requests: reports its characteristics, creates and destroys VMs
/// and runs jobs on created VMs.
///
/// Jobs are executed space-shared: each VM runs its jobs one after another in arrival order,
/// a job with `pes` PEs on a VM with `mips` per PE takes `length / (mips * min(pes, vm.pes))`.
pub struct Datacenter {
    pub id: Id,
    allocation_policy: VmAllocationPolicy,
    vms: HashMap<u32, VirtualMachine>,
    vm_busy_until: HashMap<u32, f64>,
    message_delay: f64,
    destroyed_vm_count: u32,
    executed_job_count: u32,
    ctx: SimulationContext,
}

impl Datacenter {
    pub fn new(
        hosts: Vec<PhysicalHost>,
        algorithm: Box<dyn VmPlacementAlgorithm>,
        message_delay: f64,
        ctx: SimulationContext,
    ) -> Self {
        Self {
            id: ctx.id(),
            allocation_policy: VmAllocationPolicy::new(hosts, algorithm),
            vms: HashMap::new(),
            vm_busy_until: HashMap::new(),
            message_delay,
            destroyed_vm_count: 0,
            executed_job_count: 0,
            ctx,
        }
    }

    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    pub fn characteristics(&self) -> DatacenterCharacteristics {
        let ledger = self.allocation_policy.ledger();
        DatacenterCharacteristics {
            id: self.id,
            name: self.ctx.name().to_string(),
            host_count: ledger.host_count(),
            total_pes: ledger.total_capacity_pes(),
            free_pes: ledger.total_free_pes(),
            mips_per_pe: self.allocation_policy.hosts().first().map_or(0., |host| host.mips),
        }
    }

    pub fn allocation_policy(&self) -> &VmAllocationPolicy {
        &self.allocation_policy
    }

    /// Returns VMs currently hosted by this datacenter.
    pub fn vms(&self) -> Vec<&VirtualMachine> {
        let mut vms: Vec<&VirtualMachine> = self.vms.values().collect();
        vms.sort_by_key(|vm| vm.id);
        vms
    }

    /// Returns the number of processed VM destroy requests.
    pub fn destroyed_vm_count(&self) -> u32 {
        self.destroyed_vm_count
    }

    pub fn executed_job_count(&self) -> u32 {
        self.executed_job_count
    }

    fn on_characteristics_request(&mut self, requester: Id) {
        let characteristics = self.characteristics();
        log_debug!(
            self.ctx,
            "reporting characteristics to {}: {} hosts, {} free pes",
            self.ctx.lookup_name(requester),
            characteristics.host_count,
            characteristics.free_pes
        );
        self.ctx.emit(
            CloudEvent::Characteristics {
                provider: self.id,
                characteristics,
            },
            requester,
            self.message_delay,
        );
    }

    fn on_vm_create_request(&mut self, mut vm: VirtualMachine, requester: Id) {
        let host_id = self.allocation_policy.place(&vm);
        match host_id {
            Some(host_id) => {
                log_debug!(self.ctx, "vm {} ({} pes) placed on host {}", vm.id, vm.pes, host_id);
                vm.provider = Some(self.id);
                vm.host = Some(host_id);
                self.vm_busy_until.entry(vm.id).or_insert(0.);
                self.vms.insert(vm.id, vm.clone());
            }
            None => {
                log_warn!(
                    self.ctx,
                    "failed to place vm {} ({} pes): not enough free pes",
                    vm.id,
                    vm.pes
                );
            }
        }
        self.ctx.emit(
            CloudEvent::VmCreateAck {
                provider: self.id,
                vm_id: vm.id,
                host_id,
                success: host_id.is_some(),
            },
            requester,
            self.message_delay,
        );
    }

    fn on_vm_destroy_request(&mut self, vm_id: u32) {
        self.destroyed_vm_count += 1;
        match self.allocation_policy.deallocate(vm_id) {
            Some(allocation) => {
                self.vms.remove(&vm_id);
                self.vm_busy_until.remove(&vm_id);
                log_debug!(
                    self.ctx,
                    "vm {} released {} pes on host {}",
                    vm_id,
                    allocation.pes,
                    allocation.host_id
                );
            }
            None => {
                log_error!(self.ctx, "destroy request for unknown vm {}", vm_id);
            }
        }
    }

    fn on_job_submit_request(&mut self, mut job: Job, requester: Id) {
        let now = self.ctx.time();
        let vm = job.vm_id.and_then(|vm_id| self.vms.get(&vm_id));
        match vm {
            Some(vm) => {
                let rate = vm.mips * job.pes.min(vm.pes).max(1) as f64;
                let busy_until = self.vm_busy_until.entry(vm.id).or_insert(0.);
                let start = busy_until.max(now);
                let finish = start + job.length as f64 / rate;
                *busy_until = finish;
                job.exec_start_time = Some(start);
                job.finish_time = Some(finish);
                job.status = JobStatus::Completed;
                self.executed_job_count += 1;
                log_debug!(
                    self.ctx,
                    "job {} runs on vm {} from {:.3} to {:.3}",
                    job.id,
                    vm.id,
                    start,
                    finish
                );
                self.ctx
                    .emit(CloudEvent::JobCompleted { job }, requester, finish - now + self.message_delay);
            }
            None => {
                log_error!(
                    self.ctx,
                    "job {} is submitted to vm {:?} which is not hosted here, rejecting it",
                    job.id,
                    job.vm_id
                );
                self.ctx
                    .emit(CloudEvent::JobRejected { job }, requester, self.message_delay);
            }
        }
    }
}

impl EventHandler for Datacenter {
    fn on(&mut self, event: Event) {
        match event.data {
            CloudEvent::CharacteristicsRequest => {
                self.on_characteristics_request(event.src);
            }
            CloudEvent::VmCreateRequest { vm } => {
                self.on_vm_create_request(vm, event.src);
            }
            CloudEvent::VmDestroyRequest { vm_id } => {
                self.on_vm_destroy_request(vm_id);
            }
            CloudEvent::JobSubmitRequest { job } => {
                self.on_job_submit_request(job, event.src);
            }
            CloudEvent::EndOfSimulation => {
                log_info!(self.ctx, "is shutting down");
            }
            _ => log_unhandled_event(&event),
        }
    }
}
