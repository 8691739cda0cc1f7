//! Owner-initiated sharing of version chains.

pub mod service;

pub use service::{GrantSummary, ShareRequest, SharingService};
