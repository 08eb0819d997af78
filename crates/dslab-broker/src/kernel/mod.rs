//! Discrete-event kernel driving the broker and datacenter components.
//!
//! Components own a [`SimulationContext`] which lets them read the clock and emit [`CloudEvent`](crate::core::events::CloudEvent)
//! messages to other components. The [`Simulation`] delivers events strictly in time order
//! (ties are broken by creation order) to registered [`EventHandler`]s.

pub mod context;
pub mod event;
pub mod handler;
pub mod log;
pub mod simulation;
mod state;

pub use colored;

pub use context::SimulationContext;
pub use event::{Event, EventId};
pub use handler::EventHandler;
pub use simulation::Simulation;
pub use state::EPSILON;

/// Component identifier assigned by the kernel.
pub type Id = u32;
