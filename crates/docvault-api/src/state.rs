//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use docvault_auth::{JwtDecoder, JwtEncoder};
use docvault_core::config::AppConfig;
use docvault_core::traits::BlobStore;
use docvault_database::repositories::PrincipalRepository;
use docvault_service::{QueryService, SharingService, UploadService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db_pool: SqlitePool,
    /// Blob store for version content
    pub blobs: Arc<dyn BlobStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token encoder
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Repositories ─────────────────────────────────────────
    /// Principal repository
    pub principal_repo: Arc<PrincipalRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Upload engine
    pub upload_service: Arc<UploadService>,
    /// Listings, detail, download and compare
    pub query_service: Arc<QueryService>,
    /// Grant and revoke
    pub sharing_service: Arc<SharingService>,
}
