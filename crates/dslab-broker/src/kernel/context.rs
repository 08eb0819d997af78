//! Accessing simulation from components.

use std::cell::RefCell;
use std::rc::Rc;

use rand_pcg::Pcg64;

use crate::core::events::CloudEvent;
use crate::kernel::event::EventId;
use crate::kernel::state::SimulationState;
use crate::kernel::Id;

/// A facade for accessing the simulation state and producing events from simulation components.
///
/// This is the only capability the broker and datacenters depend on: reading the clock,
/// addressing other components by id, sending them messages now or after a delay
/// and drawing from the simulation-wide random number generator.
pub struct SimulationContext {
    id: Id,
    name: String,
    sim_state: Rc<RefCell<SimulationState>>,
    names: Rc<RefCell<Vec<String>>>,
}

impl SimulationContext {
    pub(crate) fn new(
        id: Id,
        name: &str,
        sim_state: Rc<RefCell<SimulationState>>,
        names: Rc<RefCell<Vec<String>>>,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            sim_state,
            names,
        }
    }

    /// Returns the identifier of component associated with this context.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the name of component associated with this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Creates new event with specified payload, destination and delay.
    pub fn emit(&mut self, data: CloudEvent, dest: Id, delay: f64) -> EventId {
        self.sim_state.borrow_mut().add_event(data, self.id, dest, delay)
    }

    /// Creates new immediate (zero-delay) event with specified payload and destination.
    pub fn emit_now(&mut self, data: CloudEvent, dest: Id) -> EventId {
        self.sim_state.borrow_mut().add_event(data, self.id, dest, 0.)
    }

    /// Creates new immediate event for itself with specified payload.
    pub fn emit_self_now(&mut self, data: CloudEvent) -> EventId {
        self.sim_state.borrow_mut().add_event(data, self.id, self.id, 0.)
    }

    /// Runs `f` with the simulation-wide random number generator.
    ///
    /// All components share one generator seeded at simulation creation, so a run is reproducible for a fixed seed.
    /// `f` must not access the simulation through a context.
    pub fn with_rand<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Pcg64) -> R,
    {
        f(self.sim_state.borrow_mut().rand())
    }

    /// Lookup component name by its identifier.
    pub fn lookup_name(&self, id: Id) -> String {
        self.names
            .borrow()
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| format!("#{}", id))
    }
}
