pub mod broker;
pub mod capacity_ledger;
pub mod circular_host_list;
pub mod common;
pub mod config;
pub mod datacenter;
pub mod events;
pub mod host;
pub mod job;
pub mod job_binder;
pub mod job_binding_algorithm;
pub mod job_binding_algorithms;
pub mod vm;
pub mod vm_allocation_policy;
pub mod vm_placement_algorithm;
pub mod vm_placement_algorithms;
