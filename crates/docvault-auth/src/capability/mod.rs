//! Capability resolution for version chains.

pub mod resolver;

pub use resolver::{CapabilityResolver, CapabilitySource, EffectiveCapabilities};
