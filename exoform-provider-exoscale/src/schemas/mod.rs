//! Exoscale resource schema definitions

pub mod security_group;
pub mod types;
