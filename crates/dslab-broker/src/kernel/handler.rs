//! Event handling.

use crate::kernel::event::Event;

/// Trait for consuming events in simulation components.
///
/// Each component receives all of its events through this single method and dispatches on the
/// [`CloudEvent`](crate::core::events::CloudEvent) variant. Variants a component does not expect should be
/// reported via [`log_unhandled_event`](crate::kernel::log::log_unhandled_event) and otherwise ignored.
pub trait EventHandler {
    /// Processes event.
    fn on(&mut self, event: Event);
}
