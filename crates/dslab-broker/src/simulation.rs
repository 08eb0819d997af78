//! Simulation setup and execution.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;
use sugars::{rc, refcell};

use crate::core::broker::{BrokerState, DatacenterBroker};
use crate::core::config::{ConfigError, DatacenterConfig, SimulationConfig};
use crate::core::datacenter::Datacenter;
use crate::core::events::CloudEvent;
use crate::core::host::PhysicalHost;
use crate::core::job::Job;
use crate::core::job_binding_algorithm::binding_algorithm_resolver;
use crate::core::vm::VirtualMachine;
use crate::core::vm_placement_algorithm::{placement_algorithm_resolver, VmPlacementAlgorithm};
use crate::kernel::{Id, Simulation, SimulationContext};
use crate::log_info;

/// Results of the simulation run.
#[derive(Serialize, Clone, Debug)]
pub struct SimulationSummary {
    pub finish_time: f64,
    pub broker_state: BrokerState,
    /// Number of VMs available in the last binding round.
    pub created_vms: usize,
    pub received_jobs: usize,
    pub pending_jobs: usize,
    /// VM ID -> number of jobs received from this VM.
    pub jobs_per_vm: IndexMap<u32, usize>,
    /// Transition cost of the last binding round.
    pub transition_cost: Option<usize>,
    pub binding_rounds: u32,
    pub recovery_rounds: u32,
    /// Maximal finish time among received jobs.
    pub makespan: f64,
}

impl SimulationSummary {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Wires datacenters and the broker together and drives the simulation.
pub struct CloudSimulation {
    broker: Rc<RefCell<DatacenterBroker>>,
    broker_id: Id,
    datacenters: BTreeMap<Id, Rc<RefCell<Datacenter>>>,
    next_vm_id: u32,
    next_job_id: u32,
    sim: Simulation,
    ctx: SimulationContext,
    sim_config: SimulationConfig,
}

impl CloudSimulation {
    /// Creates simulation with the broker using the binding algorithm from config.
    pub fn new(mut sim: Simulation, sim_config: SimulationConfig) -> Result<Self, ConfigError> {
        let binding_algorithm = binding_algorithm_resolver(&sim_config.binding_algorithm)?;
        let broker = rc!(refcell!(DatacenterBroker::new(
            binding_algorithm,
            sim.create_context("broker"),
        )));
        broker
            .borrow_mut()
            .set_max_recovery_rounds(sim_config.max_recovery_rounds);
        let broker_id = sim.add_handler("broker", broker.clone());
        let ctx = sim.create_context("simulation");
        Ok(Self {
            broker,
            broker_id,
            datacenters: BTreeMap::new(),
            next_vm_id: 0,
            next_job_id: 0,
            sim,
            ctx,
            sim_config,
        })
    }

    /// Creates simulation with datacenters, VMs and jobs described in config.
    pub fn from_config(sim_config: SimulationConfig) -> Result<Self, ConfigError> {
        let sim = Simulation::new(sim_config.seed);
        let mut cloud_sim = Self::new(sim, sim_config.clone())?;
        for dc in sim_config.datacenters.iter() {
            cloud_sim.add_datacenter_from_config(dc)?;
        }
        for vm in sim_config.vms.iter() {
            for _ in 0..vm.count.unwrap_or(1) {
                cloud_sim.add_vm(vm.pes, vm.mips);
            }
        }
        for job in sim_config.jobs.iter() {
            for _ in 0..job.count.unwrap_or(1) {
                let job_id = cloud_sim.add_job(job.length, job.pes.unwrap_or(1));
                if let Some(vm_id) = job.vm {
                    cloud_sim.bind_job_to_vm(job_id, vm_id);
                }
            }
        }
        Ok(cloud_sim)
    }

    /// Adds datacenter with given hosts and placement algorithm, returns its component id.
    pub fn add_datacenter(
        &mut self,
        name: &str,
        hosts: Vec<PhysicalHost>,
        placement_algorithm: Box<dyn VmPlacementAlgorithm>,
    ) -> Id {
        let datacenter = rc!(refcell!(Datacenter::new(
            hosts,
            placement_algorithm,
            self.sim_config.message_delay,
            self.sim.create_context(name),
        )));
        let id = self.sim.add_handler(name, datacenter.clone());
        self.datacenters.insert(id, datacenter);
        self.broker.borrow_mut().add_provider(id);
        id
    }

    pub fn add_datacenter_from_config(&mut self, config: &DatacenterConfig) -> Result<Id, ConfigError> {
        let algorithm = placement_algorithm_resolver(config.placement_algorithm.as_deref().unwrap_or("RoundRobin"))?;
        let mut hosts = Vec::new();
        for host in config.hosts.iter() {
            let count = host.count.unwrap_or(1);
            for i in 0..count {
                let name = match (&host.name, &host.name_prefix) {
                    (Some(name), _) if count == 1 => name.clone(),
                    (_, Some(prefix)) => format!("{}{}", prefix, i + 1),
                    _ => format!("{}-host{}", config.name, hosts.len()),
                };
                hosts.push(PhysicalHost::new(hosts.len() as u32, &name, host.pes, host.mips));
            }
        }
        Ok(self.add_datacenter(&config.name, hosts, algorithm))
    }

    /// Submits VM to the broker, returns VM id.
    pub fn add_vm(&mut self, pes: u32, mips: f64) -> u32 {
        let id = self.next_vm_id;
        self.next_vm_id += 1;
        self.broker
            .borrow_mut()
            .submit_vm_list(vec![VirtualMachine::new(id, pes, mips)]);
        id
    }

    /// Submits job to the broker, returns job id.
    pub fn add_job(&mut self, length: u64, pes: u32) -> u32 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        self.broker.borrow_mut().submit_job_list(vec![Job::new(id, length, pes)]);
        id
    }

    pub fn bind_job_to_vm(&mut self, job_id: u32, vm_id: u32) -> bool {
        self.broker.borrow_mut().bind_job_to_vm(job_id, vm_id)
    }

    /// Starts the broker negotiation.
    pub fn start(&mut self) {
        log_info!(
            self.ctx,
            "starting with {} datacenters, {} vms and {} jobs",
            self.datacenters.len(),
            self.next_vm_id,
            self.next_job_id
        );
        self.broker.borrow_mut().start();
    }

    /// Sends end-of-simulation signal to the broker.
    pub fn end_simulation(&mut self) {
        self.ctx.emit_now(CloudEvent::EndOfSimulation, self.broker_id);
    }

    /// Starts the broker and runs the simulation until there are no pending events.
    pub fn run(&mut self) -> SimulationSummary {
        self.start();
        self.step_until_no_events();
        self.summary()
    }

    pub fn step(&mut self) -> bool {
        self.sim.step()
    }

    pub fn steps(&mut self, step_count: u64) -> bool {
        self.sim.steps(step_count)
    }

    pub fn step_until_no_events(&mut self) {
        self.sim.step_until_no_events();
    }

    pub fn step_for_duration(&mut self, duration: f64) -> bool {
        self.sim.step_for_duration(duration)
    }

    pub fn current_time(&self) -> f64 {
        self.sim.time()
    }

    pub fn event_count(&self) -> u64 {
        self.sim.event_count()
    }

    pub fn broker(&self) -> Rc<RefCell<DatacenterBroker>> {
        self.broker.clone()
    }

    pub fn broker_id(&self) -> Id {
        self.broker_id
    }

    /// Returns datacenter by its component id.
    ///
    /// Panics if there is no such datacenter.
    pub fn datacenter(&self, id: Id) -> Rc<RefCell<Datacenter>> {
        self.datacenters.get(&id).unwrap().clone()
    }

    pub fn datacenter_by_name(&self, name: &str) -> Option<Rc<RefCell<Datacenter>>> {
        self.sim.lookup_id(name).and_then(|id| self.datacenters.get(&id).cloned())
    }

    pub fn datacenter_ids(&self) -> Vec<Id> {
        self.datacenters.keys().copied().collect()
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn sim_config(&self) -> &SimulationConfig {
        &self.sim_config
    }

    pub fn summary(&self) -> SimulationSummary {
        let broker = self.broker.borrow();
        let mut jobs_per_vm = IndexMap::new();
        let mut makespan: f64 = 0.;
        for job in broker.received_jobs() {
            if let Some(vm_id) = job.vm_id {
                *jobs_per_vm.entry(vm_id).or_insert(0) += 1;
            }
            if let Some(finish) = job.finish_time {
                makespan = makespan.max(finish);
            }
        }
        SimulationSummary {
            finish_time: self.sim.time(),
            broker_state: broker.state(),
            created_vms: broker.last_binding_plan().map_or(0, |plan| plan.vm_load.len()),
            received_jobs: broker.received_jobs().len(),
            pending_jobs: broker.pending_jobs().len(),
            jobs_per_vm,
            transition_cost: broker.last_binding_plan().map(|plan| plan.transition_cost),
            binding_rounds: broker.binding_rounds(),
            recovery_rounds: broker.counters().recovery_rounds,
            makespan,
        }
    }
}
