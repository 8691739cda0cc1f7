//! Upload engine: decides whether an upload starts a new chain, extends an
//! existing one, or is rejected, and persists it atomically.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use docvault_auth::capability::CapabilityResolver;
use docvault_core::config::UploadConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::{BlobStore, StoredBlob};
use docvault_core::types::{NodeId, PrincipalId};
use docvault_database::repositories::{ChainWrite, PrincipalRepository, VersionNodeRepository};
use docvault_entity::node::model::DEFAULT_MIME_TYPE;
use docvault_entity::node::{NewVersionNode, VersionNode};
use docvault_entity::permission::Capability;
use docvault_storage::checksum::sha256_hex;
use docvault_storage::mime::mime_from_name;

use crate::context::RequestContext;

/// Maximum display name length.
const MAX_NAME_LEN: usize = 255;
/// Maximum virtual path length.
const MAX_PATH_LEN: usize = 500;
/// Maximum MIME type length.
const MAX_MIME_LEN: usize = 100;

/// One upload as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Logical path naming the document family.
    pub virtual_path: String,
    /// Display name, usually the uploaded file name.
    pub name: String,
    /// Raw content.
    pub data: Bytes,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Declared MIME type; guessed from `name` when absent.
    pub mime_type: Option<String>,
}

impl UploadRequest {
    /// Trim and check the request, resolving its MIME type.
    fn validated(self, config: &UploadConfig) -> AppResult<Self> {
        if self.data.is_empty() {
            return Err(AppError::validation("The submitted file is empty"));
        }
        if self.data.len() as u64 > config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                config.max_upload_size_bytes
            )));
        }

        let virtual_path = self.virtual_path.trim().to_string();
        if virtual_path.is_empty() {
            return Err(AppError::validation("A virtual path is required"));
        }
        if virtual_path.chars().count() > MAX_PATH_LEN {
            return Err(AppError::validation(format!(
                "Virtual path must be at most {MAX_PATH_LEN} characters"
            )));
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("A file name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::validation(format!(
                "File name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let mime_type = self
            .mime_type
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .or_else(|| mime_from_name(&name).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        if mime_type.len() > MAX_MIME_LEN {
            return Err(AppError::validation(format!(
                "MIME type must be at most {MAX_MIME_LEN} characters"
            )));
        }

        Ok(Self {
            virtual_path,
            name,
            data: self.data,
            notes: self.notes.map(|n| n.trim().to_string()),
            mime_type: Some(mime_type),
        })
    }
}

/// Where a new node goes.
#[derive(Debug)]
enum ChainPlacement {
    /// The caller has no chain at the path and no grant on anyone else's.
    NewRoot,
    /// Append after `latest` in the chain rooted at `root`.
    Successor {
        root: VersionNode,
        latest: VersionNode,
    },
}

/// Creates version nodes from uploads.
#[derive(Clone)]
pub struct UploadService {
    /// Version node repository.
    nodes: Arc<VersionNodeRepository>,
    /// Principal repository, for the content bootstrap.
    principals: Arc<PrincipalRepository>,
    /// Blob store for content.
    blobs: Arc<dyn BlobStore>,
    /// Limits and retry policy.
    config: UploadConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("blobs", &self.blobs.provider_type())
            .field("config", &self.config)
            .finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        nodes: Arc<VersionNodeRepository>,
        principals: Arc<PrincipalRepository>,
        blobs: Arc<dyn BlobStore>,
        config: UploadConfig,
    ) -> Self {
        Self {
            nodes,
            principals,
            blobs,
            config,
        }
    }

    /// Upload content to a virtual path.
    ///
    /// The caller's own chain at the path wins. Otherwise a chain owned by
    /// someone else is extended if the caller holds `edit` on it; holding
    /// only `view` on such a chain is refused. A caller with no grant on
    /// any chain at the path starts an independent one. Losing a concurrent
    /// race for the chain is retried transparently up to the configured
    /// bound.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        request: UploadRequest,
    ) -> AppResult<VersionNode> {
        let request = request.validated(&self.config)?;
        let checksum = sha256_hex(&request.data);

        // Written before any chain transaction so unrelated uploads store
        // content in parallel.
        let stored = self.blobs.put(request.data.clone()).await?;
        if stored.checksum != checksum {
            self.discard_blob(&stored).await;
            return Err(AppError::storage(format!(
                "Blob store digest {} does not match upload digest {checksum}",
                stored.checksum
            )));
        }

        let node = match self.place_with_retry(ctx, &request, &stored).await {
            Ok(node) => node,
            Err(e) => {
                self.discard_blob(&stored).await;
                return Err(e);
            }
        };

        info!(
            principal_id = %ctx.principal_id,
            node_id = %node.id,
            root_id = %node.chain_root_id(),
            virtual_path = %node.virtual_path,
            version = node.version_number,
            size = node.size_bytes,
            "Upload completed"
        );

        if !ctx.bootstrapped {
            self.bootstrap(ctx.principal_id).await;
        }

        Ok(node)
    }

    /// Run chain placement, retrying lost version races.
    async fn place_with_retry(
        &self,
        ctx: &RequestContext,
        request: &UploadRequest,
        stored: &StoredBlob,
    ) -> AppResult<VersionNode> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_place(ctx, request, stored).await {
                Err(e) if e.kind == ErrorKind::Conflict => {
                    if attempt >= self.config.max_conflict_retries {
                        warn!(
                            principal_id = %ctx.principal_id,
                            virtual_path = %request.virtual_path,
                            attempts = attempt + 1,
                            "Upload retries exhausted"
                        );
                        return Err(AppError::with_source(
                            ErrorKind::Conflict,
                            format!(
                                "Concurrent uploads to '{}' kept conflicting; try again",
                                request.virtual_path
                            ),
                            e,
                        ));
                    }
                    attempt += 1;
                    warn!(
                        principal_id = %ctx.principal_id,
                        virtual_path = %request.virtual_path,
                        attempt,
                        "Lost version race, retrying upload"
                    );
                    let backoff = self.config.retry_backoff_ms * u64::from(attempt);
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
                other => return other,
            }
        }
    }

    /// One attempt: resolve placement, insert, commit.
    async fn try_place(
        &self,
        ctx: &RequestContext,
        request: &UploadRequest,
        stored: &StoredBlob,
    ) -> AppResult<VersionNode> {
        let mut write = self.nodes.begin_chain_write(&request.virtual_path).await?;
        let placement = Self::place(
            &mut write,
            ctx.principal_id,
            &request.virtual_path,
            &stored.checksum,
        )
        .await?;

        let new_node = Self::build_node(ctx.principal_id, request, stored, placement);
        let node = write.insert(new_node).await?;
        write.commit().await?;
        Ok(node)
    }

    /// Decide where the upload goes, enforcing edit rights before any
    /// duplicate check so unauthorized callers learn nothing about content.
    async fn place(
        write: &mut ChainWrite,
        principal: PrincipalId,
        virtual_path: &str,
        checksum: &str,
    ) -> AppResult<ChainPlacement> {
        let roots = write.find_roots_at_path(virtual_path).await?;

        let root = if let Some(own) = roots.iter().find(|r| r.is_owned_by(principal)) {
            own.clone()
        } else {
            let mut editable = None;
            let mut viewable = false;
            for candidate in &roots {
                let effective =
                    CapabilityResolver::resolve_with(write.conn(), principal, candidate).await?;
                if effective.allows(Capability::Edit) {
                    editable = Some(candidate.clone());
                    break;
                }
                viewable |= !effective.capabilities.is_empty();
            }
            match editable {
                Some(root) => root,
                None if viewable => {
                    return Err(AppError::permission_denied(format!(
                        "You do not have permission to upload a new version of '{virtual_path}'"
                    )));
                }
                // The path is free for this owner.
                None => return Ok(ChainPlacement::NewRoot),
            }
        };

        if write.chain_contains_checksum(root.id, checksum).await? {
            return Err(AppError::duplicate_content(format!(
                "This file content already exists in the version history of '{virtual_path}'"
            )));
        }

        let latest = write
            .find_latest(root.id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Chain {} has no nodes", root.id)))?;

        Ok(ChainPlacement::Successor { root, latest })
    }

    fn build_node(
        uploader: PrincipalId,
        request: &UploadRequest,
        stored: &StoredBlob,
        placement: ChainPlacement,
    ) -> NewVersionNode {
        let (version_number, owner_id, previous_version_id, root_id) = match placement {
            ChainPlacement::NewRoot => (1, uploader, None, None),
            ChainPlacement::Successor { root, latest } => (
                latest.version_number + 1,
                root.owner_id,
                Some(latest.id),
                Some(root.id),
            ),
        };

        NewVersionNode {
            id: NodeId::new(),
            name: request.name.clone(),
            mime_type: request
                .mime_type
                .clone()
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            size_bytes: stored.size_bytes as i64,
            checksum: stored.checksum.clone(),
            blob_handle: stored.handle.clone(),
            virtual_path: request.virtual_path.clone(),
            version_number,
            owner_id,
            uploader_id: uploader,
            previous_version_id,
            root_id,
            notes: request.notes.clone().unwrap_or_default(),
        }
    }

    /// Remove a blob that will never be referenced.
    async fn discard_blob(&self, stored: &StoredBlob) {
        if let Err(e) = self.blobs.delete(&stored.handle).await {
            warn!(handle = %stored.handle, error = %e, "Failed to discard orphaned blob");
        }
    }

    /// One-time capability bootstrap, outside the upload transaction.
    async fn bootstrap(&self, principal: PrincipalId) {
        match self.principals.mark_bootstrapped(principal).await {
            Ok(true) => info!(principal_id = %principal, "Bootstrapped content capabilities"),
            Ok(false) => {}
            Err(e) => warn!(
                principal_id = %principal,
                error = %e,
                "Content capability bootstrap failed; will retry on next upload"
            ),
        }
    }
}
