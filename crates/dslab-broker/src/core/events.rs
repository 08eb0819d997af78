//! Simulation events exchanged by the broker and datacenters.

use serde::Serialize;

use crate::core::common::DatacenterCharacteristics;
use crate::core::job::Job;
use crate::core::vm::VirtualMachine;
use crate::kernel::Id;

/// Payload of every kernel event.
#[derive(Serialize, Clone, Debug)]
pub enum CloudEvent {
    // BROKER LIFECYCLE ////////////////////////////////////////////////////////////////////////////
    /// Self-event which makes the broker query all known datacenters.
    CharacteristicsRequestTrigger,
    /// Asks the end of run (sent by the broker to itself or by the simulation driver).
    EndOfSimulation,

    // NEGOTIATION /////////////////////////////////////////////////////////////////////////////////
    CharacteristicsRequest,
    Characteristics {
        provider: Id,
        characteristics: DatacenterCharacteristics,
    },
    VmCreateRequest {
        vm: VirtualMachine,
    },
    VmCreateAck {
        provider: Id,
        vm_id: u32,
        host_id: Option<u32>,
        success: bool,
    },
    VmDestroyRequest {
        vm_id: u32,
    },

    // JOB EXECUTION ///////////////////////////////////////////////////////////////////////////////
    JobSubmitRequest {
        job: Job,
    },
    JobCompleted {
        job: Job,
    },
    /// Job was sent to a datacenter which does not host its VM and was not executed.
    JobRejected {
        job: Job,
    },
}

impl CloudEvent {
    /// Returns the name of event kind used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CloudEvent::CharacteristicsRequestTrigger => "CharacteristicsRequestTrigger",
            CloudEvent::EndOfSimulation => "EndOfSimulation",
            CloudEvent::CharacteristicsRequest => "CharacteristicsRequest",
            CloudEvent::Characteristics { .. } => "Characteristics",
            CloudEvent::VmCreateRequest { .. } => "VmCreateRequest",
            CloudEvent::VmCreateAck { .. } => "VmCreateAck",
            CloudEvent::VmDestroyRequest { .. } => "VmDestroyRequest",
            CloudEvent::JobSubmitRequest { .. } => "JobSubmitRequest",
            CloudEvent::JobCompleted { .. } => "JobCompleted",
            CloudEvent::JobRejected { .. } => "JobRejected",
        }
    }
}
