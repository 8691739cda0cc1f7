//! Application builder: wires repositories, services and the router into
//! an Axum app, and runs it.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;
use tokio::sync::Notify;

use docvault_auth::{CapabilityResolver, JwtDecoder, JwtEncoder};
use docvault_core::config::AppConfig;
use docvault_core::error::{AppError, ErrorKind};
use docvault_core::traits::BlobStore;
use docvault_database::repositories::{GrantRepository, PrincipalRepository, VersionNodeRepository};
use docvault_service::{
    DocumentTextExtractor, QueryService, SharingService, TextExtractor, UploadService,
};
use docvault_storage::LocalBlobStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Wire every repository and service over a pool and a blob store.
pub fn build_state(config: AppConfig, db_pool: SqlitePool, blobs: Arc<dyn BlobStore>) -> AppState {
    // ── Repositories ─────────────────────────────────────────────
    let principal_repo = Arc::new(PrincipalRepository::new(db_pool.clone()));
    let node_repo = Arc::new(VersionNodeRepository::new(db_pool.clone()));
    let grant_repo = Arc::new(GrantRepository::new(db_pool.clone()));

    // ── Auth ─────────────────────────────────────────────────────
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let resolver = Arc::new(CapabilityResolver::new(GrantRepository::new(db_pool.clone())));

    // ── Services ─────────────────────────────────────────────────
    let extractor: Arc<dyn TextExtractor> = Arc::new(DocumentTextExtractor::new());
    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&node_repo),
        Arc::clone(&principal_repo),
        Arc::clone(&blobs),
        config.upload.clone(),
    ));
    let query_service = Arc::new(QueryService::new(
        Arc::clone(&node_repo),
        Arc::clone(&resolver),
        Arc::clone(&blobs),
        extractor,
    ));
    let sharing_service = Arc::new(SharingService::new(
        Arc::clone(&node_repo),
        Arc::clone(&principal_repo),
        grant_repo,
        resolver,
    ));

    AppState {
        config: Arc::new(config),
        db_pool,
        blobs,
        jwt_encoder,
        jwt_decoder,
        principal_repo,
        upload_service,
        query_service,
        sharing_service,
    }
}

/// Runs the DocVault server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: SqlitePool) -> Result<(), AppError> {
    tracing::info!("Starting DocVault server...");

    // ── Step 1: Initialize blob storage ──────────────────────────
    tracing::info!(root = %config.storage.root_path, "Initializing blob storage");
    let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.storage.root_path).await?);

    // ── Step 2: Build state and router ───────────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(build_state(config, db_pool, blobs));

    // ── Step 3: Start HTTP server ────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    tracing::info!(address = %addr, "DocVault server listening");

    let stopping = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let stopping = Arc::clone(&stopping);
        async move {
            shutdown_signal().await;
            stopping.notify_one();
        }
    });

    tokio::select! {
        result = server.into_future() => {
            result.map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;
        }
        _ = async {
            stopping.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, forcing shutdown");
        }
    }

    tracing::info!("DocVault server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
