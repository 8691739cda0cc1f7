//! Per-chain capability grants.

pub mod capability;
pub mod model;

pub use capability::{Capability, CapabilitySet};
pub use model::PermissionGrant;
