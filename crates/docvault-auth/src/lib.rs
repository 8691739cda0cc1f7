//! # docvault-auth
//!
//! Authorization and authentication collaborators for DocVault.
//!
//! ## Modules
//!
//! - `capability`: the single decision point answering "does this
//!   principal hold this capability on this chain?"
//! - `jwt`: bearer token creation and validation

pub mod capability;
pub mod jwt;

pub use capability::{CapabilityResolver, CapabilitySource, EffectiveCapabilities};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
