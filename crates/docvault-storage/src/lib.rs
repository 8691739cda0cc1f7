//! # docvault-storage
//!
//! Blob store implementations for DocVault: a sharded local filesystem
//! store for deployments and an in-memory store for tests and tooling.
//! Also hosts the SHA-256 checksum helpers and MIME type guessing shared
//! by the upload path.

pub mod checksum;
pub mod mime;
pub mod providers;

pub use checksum::sha256_hex;
pub use providers::{LocalBlobStore, MemoryBlobStore};
