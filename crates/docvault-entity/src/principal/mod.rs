//! Principal (user identity) entities.

pub mod model;

pub use model::{CreatePrincipal, Principal};
