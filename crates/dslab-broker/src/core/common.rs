use serde::Serialize;

/// PE reservation of a single VM recorded in the capacity ledger.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Allocation {
    pub vm_id: u32,
    pub host_id: u32,
    pub pes: u32,
}

#[derive(PartialEq, Eq, Debug)]
pub enum AllocationVerdict {
    NotEnoughPes,
    HostNotFound,
    Success,
}

/// Static description of a datacenter reported to the broker.
#[derive(Serialize, Clone, Debug)]
pub struct DatacenterCharacteristics {
    pub id: u32,
    pub name: String,
    pub host_count: u32,
    pub total_pes: u32,
    pub free_pes: u32,
    pub mips_per_pe: f64,
}
