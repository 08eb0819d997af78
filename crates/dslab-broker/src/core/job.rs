//! Jobs (units of work submitted through the broker).

use serde::Serialize;

/// Lifecycle of a job inside the broker.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Waiting in the broker for a VM binding or for its bound VM to be created.
    Pending,
    /// Sent to the datacenter owning its VM.
    Submitted,
    /// Returned by the datacenter after execution.
    Completed,
}

/// Discrete job with a length (in instructions) and PE demand.
#[derive(Serialize, Clone, Debug)]
pub struct Job {
    pub id: u32,
    pub length: u64,
    pub pes: u32,
    /// VM the job is bound to, `None` means any VM.
    pub vm_id: Option<u32>,
    /// Whether `vm_id` was set explicitly by the user (such binding is never changed by binding algorithms).
    pub pinned: bool,
    pub status: JobStatus,
    pub exec_start_time: Option<f64>,
    pub finish_time: Option<f64>,
}

impl Job {
    pub fn new(id: u32, length: u64, pes: u32) -> Self {
        Self {
            id,
            length,
            pes,
            vm_id: None,
            pinned: false,
            status: JobStatus::Pending,
            exec_start_time: None,
            finish_time: None,
        }
    }

    /// Pins the job to the specified VM.
    pub fn pin_to(&mut self, vm_id: u32) {
        self.vm_id = Some(vm_id);
        self.pinned = true;
    }

    /// Returns job execution time, if it has finished.
    pub fn execution_time(&self) -> Option<f64> {
        match (self.exec_start_time, self.finish_time) {
            (Some(start), Some(finish)) => Some(finish - start),
            _ => None,
        }
    }
}
