//! Broker negotiating VMs with datacenters and dispatching jobs to them.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::common::DatacenterCharacteristics;
use crate::core::events::CloudEvent;
use crate::core::job::{Job, JobStatus};
use crate::core::job_binder::{BindingPlan, JobBinder};
use crate::core::job_binding_algorithm::JobBindingAlgorithm;
use crate::core::vm::VirtualMachine;
use crate::kernel::log::log_unhandled_event;
use crate::kernel::{Event, EventHandler, Id, SimulationContext};
use crate::{log_debug, log_error, log_info, log_trace, log_warn};

/// Negotiation state of the broker.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrokerState {
    Init,
    AwaitingCharacteristics,
    /// VM creation requests were sent to the given datacenter, waiting for acks.
    RequestingVms {
        provider: Id,
    },
    SubmittingJobs,
    AwaitingCompletions,
    Done,
    Aborted,
}

impl BrokerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BrokerState::Done | BrokerState::Aborted)
    }
}

/// Counters of the negotiation protocol.
///
/// `vms_acks <= vms_requested` holds within each VM requesting round.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrokerCounters {
    /// VM creation requests sent in the current round.
    pub vms_requested: u32,
    /// Acks received in the current round.
    pub vms_acks: u32,
    /// VM destroy requests sent during the whole run.
    pub vms_destroyed: u32,
    /// Submitted jobs which are not completed yet.
    pub jobs_submitted: u32,
    /// Number of VM re-provisioning rounds started for postponed jobs.
    pub recovery_rounds: u32,
}

/// Broker acquires VMs from datacenters and runs the submitted jobs on them.
///
/// The broker first collects characteristics of all known datacenters, then requests the VMs
/// from datacenters one by one until all VMs are created or every datacenter was tried.
/// Once some VMs exist, pending jobs are bound to them by the configured binding algorithm and submitted
/// to the owning datacenters. Jobs bound to missing VMs are postponed and the VMs are re-provisioned after
/// all submitted jobs complete (at most `max_recovery_rounds` times).
pub struct DatacenterBroker {
    pub id: Id,
    state: BrokerState,
    state_history: Vec<BrokerState>,
    providers: Vec<Id>,
    tried_providers: HashSet<Id>,
    characteristics: IndexMap<Id, DatacenterCharacteristics>,
    vms: Vec<VirtualMachine>,
    vm_providers: IndexMap<u32, Id>,
    created_vms: Vec<VirtualMachine>,
    pending_jobs: Vec<Job>,
    submitted_jobs: IndexMap<u32, Job>,
    received_jobs: Vec<Job>,
    binder: JobBinder,
    last_plan: Option<BindingPlan>,
    counters: BrokerCounters,
    max_recovery_rounds: u32,
    shut_down: bool,
    ctx: SimulationContext,
}

impl DatacenterBroker {
    pub fn new(binding_algorithm: Box<dyn JobBindingAlgorithm>, ctx: SimulationContext) -> Self {
        Self {
            id: ctx.id(),
            state: BrokerState::Init,
            state_history: vec![BrokerState::Init],
            providers: Vec::new(),
            tried_providers: HashSet::new(),
            characteristics: IndexMap::new(),
            vms: Vec::new(),
            vm_providers: IndexMap::new(),
            created_vms: Vec::new(),
            pending_jobs: Vec::new(),
            submitted_jobs: IndexMap::new(),
            received_jobs: Vec::new(),
            binder: JobBinder::new(binding_algorithm),
            last_plan: None,
            counters: BrokerCounters::default(),
            max_recovery_rounds: 5,
            shut_down: false,
            ctx,
        }
    }

    pub fn set_max_recovery_rounds(&mut self, rounds: u32) {
        self.max_recovery_rounds = rounds;
    }

    pub fn set_binding_algorithm(&mut self, algorithm: Box<dyn JobBindingAlgorithm>) {
        self.binder.set_algorithm(algorithm);
    }

    /// Registers a datacenter which will be asked for VMs. Datacenters are tried in registration order.
    pub fn add_provider(&mut self, provider: Id) {
        if !self.providers.contains(&provider) {
            self.providers.push(provider);
        }
    }

    pub fn submit_vm_list(&mut self, vms: Vec<VirtualMachine>) {
        self.vms.extend(vms);
    }

    pub fn submit_job_list(&mut self, jobs: Vec<Job>) {
        self.pending_jobs.extend(jobs);
    }

    /// Pins the pending job to the VM, so that binding algorithms will not change its binding.
    ///
    /// Returns `false` if there is no such pending job.
    pub fn bind_job_to_vm(&mut self, job_id: u32, vm_id: u32) -> bool {
        match self.pending_jobs.iter_mut().find(|job| job.id == job_id) {
            Some(job) => {
                job.pin_to(vm_id);
                true
            }
            None => {
                log_warn!(self.ctx, "can't bind job {} to vm {}: no such pending job", job_id, vm_id);
                false
            }
        }
    }

    /// Starts the negotiation.
    pub fn start(&mut self) {
        self.ctx.emit_self_now(CloudEvent::CharacteristicsRequestTrigger);
    }

    pub fn state(&self) -> BrokerState {
        self.state
    }

    /// Returns all states the broker passed through, starting with `Init`.
    pub fn state_history(&self) -> &[BrokerState] {
        &self.state_history
    }

    pub fn counters(&self) -> BrokerCounters {
        self.counters
    }

    pub fn vms(&self) -> &[VirtualMachine] {
        &self.vms
    }

    pub fn created_vms(&self) -> &[VirtualMachine] {
        &self.created_vms
    }

    pub fn provider_of(&self, vm_id: u32) -> Option<Id> {
        self.vm_providers.get(&vm_id).copied()
    }

    pub fn characteristics(&self) -> &IndexMap<Id, DatacenterCharacteristics> {
        &self.characteristics
    }

    pub fn pending_jobs(&self) -> &[Job] {
        &self.pending_jobs
    }

    pub fn received_jobs(&self) -> &[Job] {
        &self.received_jobs
    }

    /// Returns the number of times the binding algorithm was invoked.
    pub fn binding_rounds(&self) -> u32 {
        self.binder.rounds()
    }

    pub fn last_binding_plan(&self) -> Option<&BindingPlan> {
        self.last_plan.as_ref()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn set_state(&mut self, state: BrokerState) {
        log_trace!(self.ctx, "state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.state_history.push(state);
    }

    fn on_characteristics_request_trigger(&mut self) {
        if self.state != BrokerState::Init {
            log_warn!(self.ctx, "ignoring start request in state {:?}", self.state);
            return;
        }
        if self.providers.is_empty() {
            log_error!(self.ctx, "no datacenters are known");
            self.abort();
            return;
        }
        log_info!(self.ctx, "starting, querying {} datacenters", self.providers.len());
        for i in 0..self.providers.len() {
            self.ctx.emit_now(CloudEvent::CharacteristicsRequest, self.providers[i]);
        }
        self.set_state(BrokerState::AwaitingCharacteristics);
    }

    fn on_characteristics(&mut self, provider: Id, characteristics: DatacenterCharacteristics) {
        if self.state != BrokerState::AwaitingCharacteristics {
            log_warn!(
                self.ctx,
                "ignoring characteristics of {} in state {:?}",
                self.ctx.lookup_name(provider),
                self.state
            );
            return;
        }
        if !self.providers.contains(&provider) {
            log_warn!(
                self.ctx,
                "ignoring characteristics of unknown datacenter {}",
                self.ctx.lookup_name(provider)
            );
            return;
        }
        log_debug!(
            self.ctx,
            "received characteristics of {}: {} hosts, {} free pes",
            characteristics.name,
            characteristics.host_count,
            characteristics.free_pes
        );
        self.characteristics.insert(provider, characteristics);
        if self.characteristics.len() == self.providers.len() {
            self.tried_providers.clear();
            let first = self.providers[0];
            self.request_vms(first);
        }
    }

    fn request_vms(&mut self, provider: Id) {
        self.set_state(BrokerState::RequestingVms { provider });
        self.tried_providers.insert(provider);
        self.counters.vms_requested = 0;
        self.counters.vms_acks = 0;
        for i in 0..self.vms.len() {
            if self.vm_providers.contains_key(&self.vms[i].id) {
                continue;
            }
            log_debug!(
                self.ctx,
                "trying to create vm {} in {}",
                self.vms[i].id,
                self.ctx.lookup_name(provider)
            );
            self.ctx.emit_now(
                CloudEvent::VmCreateRequest {
                    vm: self.vms[i].clone(),
                },
                provider,
            );
            self.counters.vms_requested += 1;
        }
        if self.counters.vms_requested == 0 {
            self.finish_vm_round();
        }
    }

    fn on_vm_create_ack(&mut self, provider: Id, vm_id: u32, host_id: Option<u32>, success: bool) {
        let expected = match self.state {
            BrokerState::RequestingVms { provider: current } => current,
            _ if self.state.is_terminal() && success => {
                // creation was still in flight at the end of run
                log_info!(
                    self.ctx,
                    "destroying vm {} created in {} after the end of negotiation",
                    vm_id,
                    self.ctx.lookup_name(provider)
                );
                self.ctx.emit_now(CloudEvent::VmDestroyRequest { vm_id }, provider);
                self.counters.vms_destroyed += 1;
                return;
            }
            _ => {
                log_warn!(self.ctx, "ignoring ack for vm {} in state {:?}", vm_id, self.state);
                return;
            }
        };
        if provider != expected {
            log_warn!(
                self.ctx,
                "ignoring ack for vm {} from {} while requesting from {}",
                vm_id,
                self.ctx.lookup_name(provider),
                self.ctx.lookup_name(expected)
            );
            return;
        }
        self.counters.vms_acks += 1;
        if success {
            match self.vms.iter_mut().find(|vm| vm.id == vm_id) {
                Some(vm) => {
                    vm.provider = Some(provider);
                    vm.host = host_id;
                    self.vm_providers.insert(vm_id, provider);
                    self.created_vms.push(vm.clone());
                    log_info!(self.ctx, "vm {} is created in {}", vm_id, self.ctx.lookup_name(provider));
                }
                None => log_error!(self.ctx, "ack for unknown vm {}", vm_id),
            }
        } else {
            log_warn!(
                self.ctx,
                "creation of vm {} failed in {}",
                vm_id,
                self.ctx.lookup_name(provider)
            );
        }

        if !self.created_vms.is_empty() && self.created_vms.len() == self.vms.len() {
            self.submit_jobs();
        } else if self.counters.vms_acks == self.counters.vms_requested {
            self.finish_vm_round();
        }
    }

    /// Called when all acks from the current datacenter are received but some VMs are still missing.
    fn finish_vm_round(&mut self) {
        let next = self
            .providers
            .iter()
            .copied()
            .find(|provider| !self.tried_providers.contains(provider));
        if let Some(provider) = next {
            self.request_vms(provider);
        } else if !self.created_vms.is_empty() {
            log_info!(
                self.ctx,
                "created {} of {} vms, proceeding with jobs",
                self.created_vms.len(),
                self.vms.len()
            );
            self.submit_jobs();
        } else {
            log_error!(self.ctx, "none of the required VMs could be created");
            self.abort();
        }
    }

    fn submit_jobs(&mut self) {
        self.set_state(BrokerState::SubmittingJobs);
        let binder = &mut self.binder;
        let pending = &mut self.pending_jobs;
        let created = &self.created_vms;
        let plan = self.ctx.with_rand(|rand| binder.bind(pending, created, rand));
        log_info!(
            self.ctx,
            "bound {} jobs (transition cost {}), {} postponed",
            plan.bindings.len(),
            plan.transition_cost,
            plan.postponed.len()
        );
        for (vm_id, load) in plan.vm_load.iter() {
            log_debug!(self.ctx, "vm {} gets {} jobs", vm_id, load);
        }

        let pending = std::mem::take(&mut self.pending_jobs);
        for mut job in pending {
            let target = plan
                .bindings
                .get(&job.id)
                .and_then(|vm_id| self.vm_providers.get(vm_id).copied());
            match target {
                Some(provider) => {
                    log_debug!(
                        self.ctx,
                        "sending job {} to vm {:?} in {}",
                        job.id,
                        job.vm_id,
                        self.ctx.lookup_name(provider)
                    );
                    job.status = JobStatus::Submitted;
                    self.submitted_jobs.insert(job.id, job.clone());
                    self.ctx.emit_now(CloudEvent::JobSubmitRequest { job }, provider);
                    self.counters.jobs_submitted += 1;
                }
                None => {
                    log_info!(
                        self.ctx,
                        "postponing execution of job {}: bound vm {:?} is not available",
                        job.id,
                        job.vm_id
                    );
                    self.pending_jobs.push(job);
                }
            }
        }
        self.last_plan = Some(plan);
        self.set_state(BrokerState::AwaitingCompletions);

        if self.counters.jobs_submitted == 0 {
            self.check_completion();
        }
    }

    fn on_job_completed(&mut self, mut job: Job) {
        if self.state != BrokerState::AwaitingCompletions {
            log_warn!(self.ctx, "ignoring completion of job {} in state {:?}", job.id, self.state);
            return;
        }
        if self.submitted_jobs.remove(&job.id).is_none() {
            log_warn!(self.ctx, "ignoring completion of unknown job {}", job.id);
            return;
        }
        job.status = JobStatus::Completed;
        log_debug!(self.ctx, "job {} received", job.id);
        self.received_jobs.push(job);
        self.counters.jobs_submitted -= 1;
        if self.counters.jobs_submitted == 0 {
            self.check_completion();
        }
    }

    /// Returns a job which was not executed by its datacenter to the pending jobs.
    fn on_job_rejected(&mut self, mut job: Job) {
        if self.state != BrokerState::AwaitingCompletions {
            log_warn!(self.ctx, "ignoring rejection of job {} in state {:?}", job.id, self.state);
            return;
        }
        if self.submitted_jobs.remove(&job.id).is_none() {
            log_warn!(self.ctx, "ignoring rejection of unknown job {}", job.id);
            return;
        }
        log_warn!(
            self.ctx,
            "job {} was rejected by the owner of vm {:?}, it will be resubmitted",
            job.id,
            job.vm_id
        );
        job.status = JobStatus::Pending;
        job.exec_start_time = None;
        job.finish_time = None;
        self.pending_jobs.push(job);
        self.counters.jobs_submitted -= 1;
        if self.counters.jobs_submitted == 0 {
            self.check_completion();
        }
    }

    /// Called when no submitted jobs are outstanding.
    fn check_completion(&mut self) {
        if self.pending_jobs.is_empty() {
            log_info!(self.ctx, "all {} jobs are received", self.received_jobs.len());
            self.teardown();
            self.set_state(BrokerState::Done);
            self.ctx.emit_self_now(CloudEvent::EndOfSimulation);
        } else {
            self.recover();
        }
    }

    /// Re-provisions VMs for the postponed jobs.
    fn recover(&mut self) {
        if self.counters.recovery_rounds >= self.max_recovery_rounds {
            log_error!(
                self.ctx,
                "giving up after {} recovery rounds, {} jobs remain pending",
                self.counters.recovery_rounds,
                self.pending_jobs.len()
            );
            self.abort();
            return;
        }
        self.counters.recovery_rounds += 1;
        log_info!(
            self.ctx,
            "{} jobs are still pending, requesting vms again (round {})",
            self.pending_jobs.len(),
            self.counters.recovery_rounds
        );
        self.teardown();
        self.tried_providers.clear();
        let first = self.providers[0];
        self.request_vms(first);
    }

    /// Sends destroy requests for all created VMs and forgets their ownership.
    fn teardown(&mut self) {
        if self.created_vms.is_empty() {
            return;
        }
        log_info!(self.ctx, "destroying {} vms", self.created_vms.len());
        for vm in self.created_vms.drain(..) {
            if let Some(provider) = self.vm_providers.get(&vm.id) {
                self.ctx
                    .emit_now(CloudEvent::VmDestroyRequest { vm_id: vm.id }, *provider);
                self.counters.vms_destroyed += 1;
            }
        }
        self.vm_providers.clear();
        for vm in self.vms.iter_mut() {
            vm.provider = None;
            vm.host = None;
        }
    }

    fn abort(&mut self) {
        self.teardown();
        self.set_state(BrokerState::Aborted);
        self.ctx.emit_self_now(CloudEvent::EndOfSimulation);
    }

    fn on_end_of_simulation(&mut self) {
        if self.shut_down {
            log_debug!(self.ctx, "already shut down");
            return;
        }
        if !self.state.is_terminal() {
            log_info!(self.ctx, "end of simulation requested in state {:?}", self.state);
            self.teardown();
            self.set_state(BrokerState::Done);
        }
        self.shut_down = true;
        log_info!(self.ctx, "is shutting down");
    }
}

impl EventHandler for DatacenterBroker {
    fn on(&mut self, event: Event) {
        match event.data {
            CloudEvent::CharacteristicsRequestTrigger => {
                self.on_characteristics_request_trigger();
            }
            CloudEvent::Characteristics {
                provider,
                characteristics,
            } => {
                self.on_characteristics(provider, characteristics);
            }
            CloudEvent::VmCreateAck {
                provider,
                vm_id,
                host_id,
                success,
            } => {
                self.on_vm_create_ack(provider, vm_id, host_id, success);
            }
            CloudEvent::JobCompleted { job } => {
                self.on_job_completed(job);
            }
            CloudEvent::JobRejected { job } => {
                self.on_job_rejected(job);
            }
            CloudEvent::EndOfSimulation => {
                self.on_end_of_simulation();
            }
            _ => log_unhandled_event(&event),
        }
    }
}
