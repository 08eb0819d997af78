//! Virtual machine model.

use serde::Serialize;

use crate::kernel::Id;

/// Virtual execution resource requested by the broker and hosted by some datacenter.
#[derive(Serialize, Clone, Debug)]
pub struct VirtualMachine {
    pub id: u32,
    /// Number of processing elements required by the VM.
    pub pes: u32,
    /// Capacity of each processing element in MIPS.
    pub mips: f64,
    /// Datacenter owning the VM, set once the placement succeeds.
    pub provider: Option<Id>,
    /// Physical host inside the owning datacenter.
    pub host: Option<u32>,
}

impl VirtualMachine {
    pub fn new(id: u32, pes: u32, mips: f64) -> Self {
        Self {
            id,
            pes,
            mips,
            provider: None,
            host: None,
        }
    }

    /// Estimates the time needed to run the specified amount of instructions on this VM.
    pub fn estimate_time(&self, length: u64) -> f64 {
        length as f64 / self.mips
    }
}
