use std::cmp::Ordering;

use crate::core::events::CloudEvent;
use crate::kernel::Id;

pub type EventId = u64;

/// Event scheduled in the kernel queue.
pub struct Event {
    pub id: EventId,
    pub time: f64,
    pub src: Id,
    pub dest: Id,
    pub data: CloudEvent,
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
