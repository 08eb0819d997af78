use std::collections::BinaryHeap;

use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::core::events::CloudEvent;
use crate::kernel::event::{Event, EventId};
use crate::kernel::log::log_incorrect_event;
use crate::kernel::Id;

/// Epsilon to compare floating point values for equality.
pub const EPSILON: f64 = 1e-12;

pub struct SimulationState {
    clock: f64,
    rand: Pcg64,
    events: BinaryHeap<Event>,
    event_count: u64,
}

impl SimulationState {
    pub fn new(seed: u64) -> Self {
        Self {
            clock: 0.0,
            rand: Pcg64::seed_from_u64(seed),
            events: BinaryHeap::new(),
            event_count: 0,
        }
    }

    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn rand(&mut self) -> &mut Pcg64 {
        &mut self.rand
    }

    pub fn add_event(&mut self, data: CloudEvent, src: Id, dest: Id, delay: f64) -> EventId {
        let event_id = self.event_count;
        let event = Event {
            id: event_id,
            time: self.clock + delay.max(0.),
            src,
            dest,
            data,
        };
        if delay >= -EPSILON {
            self.events.push(event);
            self.event_count += 1;
            event_id
        } else {
            log_incorrect_event(&event, &format!("negative delay {}", delay));
            panic!("Event delay is negative! It is not allowed to add events from the past.");
        }
    }

    pub fn next_event(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.clock = event.time;
        Some(event)
    }

    pub fn peek_event(&self) -> Option<&Event> {
        self.events.peek()
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}
