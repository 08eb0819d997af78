//! Simulation configuration and execution.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::Level::Trace;
use log::{debug, log_enabled, trace};
use serde_json::json;

use crate::kernel::context::SimulationContext;
use crate::kernel::handler::EventHandler;
use crate::kernel::log::{get_colored, log_undelivered_event};
use crate::kernel::state::SimulationState;
use crate::kernel::Id;

/// Represents a simulation, provides methods for its configuration and execution.
pub struct Simulation {
    sim_state: Rc<RefCell<SimulationState>>,
    name_to_id: HashMap<String, Id>,
    names: Rc<RefCell<Vec<String>>>,
    handlers: Vec<Option<Rc<RefCell<dyn EventHandler>>>>,
}

impl Simulation {
    /// Creates a new simulation with specified random seed.
    pub fn new(seed: u64) -> Self {
        Self {
            sim_state: Rc::new(RefCell::new(SimulationState::new(seed))),
            name_to_id: HashMap::new(),
            names: Rc::new(RefCell::new(Vec::new())),
            handlers: Vec::new(),
        }
    }

    fn register(&mut self, name: &str) -> Id {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.name_to_id.len() as Id;
        self.name_to_id.insert(name.to_owned(), id);
        self.names.borrow_mut().push(name.to_owned());
        self.handlers.push(None);
        id
    }

    /// Returns the identifier of component by its name, if it is registered.
    pub fn lookup_id(&self, name: &str) -> Option<Id> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the name of component by its identifier.
    ///
    /// Panics if component with such id does not exist.
    pub fn lookup_name(&self, id: Id) -> String {
        self.names.borrow()[id as usize].clone()
    }

    /// Creates a new simulation context with specified name.
    ///
    /// Component ids are assigned sequentially starting from 0.
    pub fn create_context<S>(&mut self, name: S) -> SimulationContext
    where
        S: AsRef<str>,
    {
        let ctx = SimulationContext::new(
            self.register(name.as_ref()),
            name.as_ref(),
            self.sim_state.clone(),
            self.names.clone(),
        );
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Created context: {}",
            self.time(),
            get_colored("DEBUG", colored::Color::Blue),
            json!({"name": ctx.name(), "id": ctx.id()})
        );
        ctx
    }

    /// Registers the event handler implementation for component with specified name, returns the component id.
    ///
    /// If a context with this name was created before, its id is reused.
    pub fn add_handler<S>(&mut self, name: S, handler: Rc<RefCell<dyn EventHandler>>) -> Id
    where
        S: AsRef<str>,
    {
        let id = self.register(name.as_ref());
        self.handlers[id as usize] = Some(handler);
        debug!(
            target: "simulation",
            "[{:.3} {} simulation] Added handler: {}",
            self.time(),
            get_colored("DEBUG", colored::Color::Blue),
            json!({"name": name.as_ref(), "id": id})
        );
        id
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> f64 {
        self.sim_state.borrow().time()
    }

    /// Performs a single step through the simulation.
    ///
    /// Takes the next event from the queue, advances the simulation time to event time and passes it to the
    /// handler of `event.dest`. Events without registered handler are logged and discarded.
    ///
    /// Returns `true` if some pending event was found and `false` otherwise.
    pub fn step(&mut self) -> bool {
        let next = self.sim_state.borrow_mut().next_event();
        if let Some(event) = next {
            if log_enabled!(Trace) {
                let src_name = self.lookup_name(event.src);
                let dest_name = self.lookup_name(event.dest);
                trace!(
                    target: &dest_name,
                    "[{:.3} {} {}] {}",
                    event.time,
                    get_colored("EVENT", colored::Color::BrightBlack),
                    dest_name,
                    json!({"type": event.data.kind(), "data": event.data, "src": src_name})
                );
            }
            let handler = self.handlers.get(event.dest as usize).cloned().flatten();
            match handler {
                Some(handler) => handler.borrow_mut().on(event),
                None => log_undelivered_event(&event),
            }
            true
        } else {
            false
        }
    }

    /// Performs the specified number of steps through the simulation.
    ///
    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn steps(&mut self, step_count: u64) -> bool {
        for _ in 0..step_count {
            if !self.step() {
                return false;
            }
        }
        true
    }

    /// Steps through the simulation until there are no pending events left.
    pub fn step_until_no_events(&mut self) {
        while self.step() {}
    }

    /// Steps through the simulation until the next event time is above `current_time + duration`
    /// or there are no pending events left.
    ///
    /// Returns `true` if there could be more pending events and `false` otherwise.
    pub fn step_for_duration(&mut self, duration: f64) -> bool {
        let end_time = self.sim_state.borrow().time() + duration;
        loop {
            if let Some(event) = self.sim_state.borrow().peek_event() {
                if event.time > end_time {
                    return true;
                }
            } else {
                return false;
            }
            self.step();
        }
    }

    /// Returns the total number of created events.
    pub fn event_count(&self) -> u64 {
        self.sim_state.borrow().event_count()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use sugars::{rc, refcell};

    use super::*;
    use crate::core::events::CloudEvent;
    use crate::kernel::event::Event;

    struct Recorder {
        received: Rc<RefCell<Vec<(f64, &'static str)>>>,
    }

    impl EventHandler for Recorder {
        fn on(&mut self, event: Event) {
            self.received.borrow_mut().push((event.time, event.data.kind()));
        }
    }

    fn setup(sim: &mut Simulation) -> (SimulationContext, Id, Rc<RefCell<Vec<(f64, &'static str)>>>) {
        let received = rc!(refcell!(Vec::new()));
        let ctx = sim.create_context("client");
        let dest = sim.add_handler(
            "recorder",
            rc!(refcell!(Recorder {
                received: received.clone()
            })),
        );
        (ctx, dest, received)
    }

    #[test]
    fn events_are_ordered_by_time_then_creation() {
        let mut sim = Simulation::new(1);
        let (mut ctx, dest, received) = setup(&mut sim);
        ctx.emit(CloudEvent::EndOfSimulation, dest, 2.);
        ctx.emit_now(CloudEvent::CharacteristicsRequest, dest);
        ctx.emit(CloudEvent::CharacteristicsRequestTrigger, dest, 2.);
        sim.step_until_no_events();
        assert_eq!(
            *received.borrow(),
            vec![
                (0., "CharacteristicsRequest"),
                (2., "EndOfSimulation"),
                (2., "CharacteristicsRequestTrigger")
            ]
        );
        assert_eq!(sim.time(), 2.);
        assert_eq!(sim.event_count(), 3);
    }

    #[test]
    fn step_for_duration_keeps_later_events() {
        let mut sim = Simulation::new(1);
        let (mut ctx, dest, received) = setup(&mut sim);
        ctx.emit(CloudEvent::EndOfSimulation, dest, 1.);
        ctx.emit(CloudEvent::EndOfSimulation, dest, 5.);
        assert!(sim.step_for_duration(2.));
        assert_eq!(received.borrow().len(), 1);
        assert!(!sim.step_for_duration(10.));
        assert_eq!(received.borrow().len(), 2);
    }

    #[test]
    fn undelivered_events_are_dropped() {
        let mut sim = Simulation::new(1);
        let (mut ctx, _, received) = setup(&mut sim);
        ctx.emit_self_now(CloudEvent::EndOfSimulation);
        assert!(sim.step());
        assert!(!sim.step());
        assert!(received.borrow().is_empty());
        assert_eq!(sim.lookup_id("client"), Some(ctx.id()));
        assert_eq!(ctx.lookup_name(42), "#42");
    }

    #[test]
    fn random_is_shared_and_reproducible() {
        let mut first = Simulation::new(7);
        let mut second = Simulation::new(7);
        let a = first.create_context("a");
        let b = first.create_context("b");
        let c = second.create_context("c");
        let drawn: Vec<u32> = (0..10)
            .map(|i| {
                let ctx = if i % 2 == 0 { &a } else { &b };
                ctx.with_rand(|rand| rand.gen_range(0..100))
            })
            .collect();
        let expected: Vec<u32> = (0..10).map(|_| c.with_rand(|rand| rand.gen_range(0..100))).collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    #[should_panic]
    fn negative_delay_panics() {
        let mut sim = Simulation::new(1);
        let (mut ctx, dest, _) = setup(&mut sim);
        ctx.emit(CloudEvent::EndOfSimulation, dest, -1.);
    }
}
