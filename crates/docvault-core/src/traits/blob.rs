//! Blob store trait for raw document bytes.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;

/// Opaque key under which a blob store keeps one upload's bytes.
///
/// Handles embed the SHA-256 digest of the content they were created for,
/// followed by a random suffix, so two uploads of identical bytes never
/// share a handle and a store can verify content on read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct BlobHandle(String);

impl BlobHandle {
    /// Wrap an existing handle string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Allocate a fresh handle for content with the given hex digest.
    ///
    /// Layout: `ab/cd/<digest>-<suffix>` where `ab` and `cd` are the first
    /// two byte pairs of the digest.
    pub fn for_content(checksum: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let (shard_a, shard_b) = match (checksum.get(0..2), checksum.get(2..4)) {
            (Some(a), Some(b)) => (a, b),
            _ => ("00", "00"),
        };
        Self(format!("{shard_a}/{shard_b}/{checksum}-{}", &suffix[..12]))
    }

    /// The digest this handle was allocated for, if the handle is well-formed.
    pub fn checksum(&self) -> Option<&str> {
        let file = self.0.rsplit('/').next()?;
        let (digest, _) = file.split_once('-')?;
        (digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit())).then_some(digest)
    }

    /// Borrow the raw handle string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a successful [`BlobStore::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Handle to retrieve the bytes later.
    pub handle: BlobHandle,
    /// SHA-256 hex digest computed by the store while writing.
    pub checksum: String,
    /// Number of bytes written.
    pub size_bytes: u64,
}

/// Content storage for uploaded bytes.
///
/// The upload engine stores the returned handle on the version node and
/// never interprets it. Implementations live in `docvault-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the store is usable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Persist bytes under a freshly allocated handle.
    async fn put(&self, data: Bytes) -> AppResult<StoredBlob>;

    /// Read the bytes behind a handle.
    ///
    /// Fails with `NotFound` when the blob is absent and with `Storage` when
    /// the bytes no longer match the digest embedded in the handle.
    async fn get(&self, handle: &BlobHandle) -> AppResult<Bytes>;

    /// Check whether a blob exists.
    async fn exists(&self, handle: &BlobHandle) -> AppResult<bool>;

    /// Remove a blob. Removing an absent blob is not an error.
    async fn delete(&self, handle: &BlobHandle) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn test_handle_layout_is_sharded_by_digest() {
        let handle = BlobHandle::for_content(DIGEST);
        assert!(handle.as_str().starts_with("9f/86/9f86d081"));
        assert_eq!(handle.checksum(), Some(DIGEST));
    }

    #[test]
    fn test_handles_for_same_content_differ() {
        assert_ne!(BlobHandle::for_content(DIGEST), BlobHandle::for_content(DIGEST));
    }

    #[test]
    fn test_malformed_handle_has_no_checksum() {
        assert_eq!(BlobHandle::new("uploads/readme.txt").checksum(), None);
        assert_eq!(BlobHandle::new("ab/cd/zz-123").checksum(), None);
    }
}
