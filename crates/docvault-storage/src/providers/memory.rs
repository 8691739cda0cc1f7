//! In-memory blob store.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::{BlobHandle, BlobStore, StoredBlob};

use crate::checksum::sha256_hex;

/// Blob store backed by a concurrent map. Contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<BlobHandle, Bytes>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, data: Bytes) -> AppResult<StoredBlob> {
        let checksum = sha256_hex(&data);
        let handle = BlobHandle::for_content(&checksum);
        let size_bytes = data.len() as u64;
        self.blobs.insert(handle.clone(), data);
        Ok(StoredBlob {
            handle,
            checksum,
            size_bytes,
        })
    }

    async fn get(&self, handle: &BlobHandle) -> AppResult<Bytes> {
        self.blobs
            .get(handle)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {handle}")))
    }

    async fn exists(&self, handle: &BlobHandle) -> AppResult<bool> {
        Ok(self.blobs.contains_key(handle))
    }

    async fn delete(&self, handle: &BlobHandle) -> AppResult<()> {
        self.blobs.remove(handle);
        Ok(())
    }
}
