//! Core traits defined in `docvault-core` and implemented by other crates.

pub mod blob;

pub use blob::{BlobHandle, BlobStore, StoredBlob};
