//! Shared wiring for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;

use docvault_auth::CapabilityResolver;
use docvault_core::config::{DatabaseConfig, UploadConfig};
use docvault_core::result::AppResult;
use docvault_core::traits::BlobStore;
use docvault_database::DatabasePool;
use docvault_database::migration::run_migrations;
use docvault_database::repositories::{GrantRepository, PrincipalRepository, VersionNodeRepository};
use docvault_entity::node::VersionNode;
use docvault_entity::principal::{CreatePrincipal, Principal};
use docvault_service::share::ShareRequest;
use docvault_service::{
    DocumentTextExtractor, QueryService, RequestContext, SharingService, UploadRequest, UploadService,
};
use docvault_storage::MemoryBlobStore;

/// Services over a fresh on-disk database and an in-memory blob store.
pub struct TestEnv {
    _dir: tempfile::TempDir,
    pub principals: Arc<PrincipalRepository>,
    pub nodes: Arc<VersionNodeRepository>,
    pub blobs: MemoryBlobStore,
    pub uploads: UploadService,
    pub queries: QueryService,
    pub sharing: SharingService,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_blobs(MemoryBlobStore::new(), None).await
    }

    /// Same as [`TestEnv::new`] but uploads go to `upload_store` when given.
    pub async fn with_blobs(blobs: MemoryBlobStore, upload_store: Option<Arc<dyn BlobStore>>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DatabaseConfig {
            url: format!("sqlite://{}/service.db", dir.path().display()),
            max_connections: 16,
            ..DatabaseConfig::default()
        };
        let db = DatabasePool::connect(&config).await.expect("connect");
        run_migrations(db.pool()).await.expect("migrate");
        let pool = db.into_pool();

        let principals = Arc::new(PrincipalRepository::new(pool.clone()));
        let nodes = Arc::new(VersionNodeRepository::new(pool.clone()));
        let grants = Arc::new(GrantRepository::new(pool.clone()));
        let resolver = Arc::new(CapabilityResolver::new(GrantRepository::new(pool)));
        let shared_store: Arc<dyn BlobStore> = Arc::new(blobs.clone());

        let upload_config = UploadConfig {
            max_conflict_retries: 20,
            retry_backoff_ms: 5,
            ..UploadConfig::default()
        };

        Self {
            _dir: dir,
            uploads: UploadService::new(
                Arc::clone(&nodes),
                Arc::clone(&principals),
                upload_store.unwrap_or_else(|| Arc::clone(&shared_store)),
                upload_config,
            ),
            queries: QueryService::new(
                Arc::clone(&nodes),
                Arc::clone(&resolver),
                shared_store,
                Arc::new(DocumentTextExtractor::new()),
            ),
            sharing: SharingService::new(
                Arc::clone(&nodes),
                Arc::clone(&principals),
                grants,
                resolver,
            ),
            principals,
            nodes,
            blobs,
        }
    }

    /// Register a principal and return its request context.
    pub async fn user(&self, email: &str) -> RequestContext {
        let principal: Principal = self
            .principals
            .create(&CreatePrincipal {
                email: email.to_string(),
                display_name: email.split('@').next().unwrap_or(email).to_string(),
                is_staff: false,
            })
            .await
            .expect("create principal");
        RequestContext::new(&principal)
    }

    pub async fn upload(
        &self,
        ctx: &RequestContext,
        path: &str,
        content: &str,
    ) -> AppResult<VersionNode> {
        self.uploads
            .upload(ctx, request(path, "notes.txt", content))
            .await
    }

    pub async fn share(&self, owner: &RequestContext, node: &VersionNode, email: &str, can_edit: bool) {
        self.sharing
            .grant(
                owner,
                ShareRequest {
                    node_id: node.id,
                    target_email: email.to_string(),
                    can_edit,
                },
            )
            .await
            .expect("share");
    }
}

pub fn request(path: &str, name: &str, content: &str) -> UploadRequest {
    UploadRequest {
        virtual_path: path.to_string(),
        name: name.to_string(),
        data: Bytes::from(content.to_string()),
        notes: None,
        mime_type: None,
    }
}
