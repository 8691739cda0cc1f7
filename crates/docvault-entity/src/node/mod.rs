//! Version node entities.

pub mod model;

pub use model::{NewVersionNode, VersionNode};
