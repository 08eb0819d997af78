//! Physical host model.

use serde::Serialize;

/// Physical host of a datacenter, a set of identical processing elements.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PhysicalHost {
    pub id: u32,
    pub name: String,
    pub pes: u32,
    /// Capacity of each processing element in MIPS.
    pub mips: f64,
}

impl PhysicalHost {
    pub fn new(id: u32, name: &str, pes: u32, mips: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            pes,
            mips,
        }
    }
}
