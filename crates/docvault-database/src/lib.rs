//! # docvault-database
//!
//! SQLite connection management, embedded migrations, and concrete
//! repository implementations for principals, version nodes, and
//! permission grants.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
