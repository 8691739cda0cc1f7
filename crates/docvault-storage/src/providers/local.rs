//! Local filesystem blob store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::{BlobHandle, BlobStore, StoredBlob};

use crate::checksum::{sha256_hex, verify};

/// Blob store keeping each upload in its own file under a root directory,
/// sharded by the leading digest bytes.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a handle to an absolute path within the root.
    ///
    /// Handles are generated by this crate, but a handle read back from the
    /// database is still refused if it tries to leave the root.
    fn resolve(&self, handle: &BlobHandle) -> AppResult<PathBuf> {
        let clean = handle.as_str().trim_start_matches('/');
        if clean.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(AppError::storage(format!("Invalid blob handle: {handle}")));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn put(&self, data: Bytes) -> AppResult<StoredBlob> {
        let checksum = sha256_hex(&data);
        let handle = BlobHandle::for_content(&checksum);
        let full_path = self.resolve(&handle)?;
        self.ensure_parent(&full_path).await?;

        // Write to a sibling temp file, then rename into place.
        let tmp_path = full_path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        fs::write(&tmp_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write blob: {handle}"),
                e,
            )
        })?;
        if let Err(e) = fs::rename(&tmp_path, &full_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to finalize blob: {handle}"),
                e,
            ));
        }

        debug!(handle = %handle, bytes = data.len(), "Wrote blob");
        Ok(StoredBlob {
            handle,
            checksum,
            size_bytes: data.len() as u64,
        })
    }

    async fn get(&self, handle: &BlobHandle) -> AppResult<Bytes> {
        let full_path = self.resolve(handle)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {handle}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read blob: {handle}"),
                    e,
                )
            }
        })?;
        verify(handle, &data)?;
        Ok(Bytes::from(data))
    }

    async fn exists(&self, handle: &BlobHandle) -> AppResult<bool> {
        let full_path = self.resolve(handle)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat blob: {handle}"),
                e,
            )
        })
    }

    async fn delete(&self, handle: &BlobHandle) -> AppResult<()> {
        let full_path = self.resolve(handle)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(handle = %handle, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete blob: {handle}"),
                e,
            )),
        }
    }
}
