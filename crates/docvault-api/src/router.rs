//! Route definitions for the DocVault HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_size_bytes;

    let api_routes = Router::new()
        .merge(document_routes())
        .merge(file_routes())
        .merge(share_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Upload, listings, detail
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            get(handlers::document::list_owned).post(handlers::document::upload_document),
        )
        .route("/documents/shared", get(handlers::document::list_shared))
        .route("/documents/{id}", get(handlers::document::get_document))
        .route(
            "/documents/{id}/versions",
            get(handlers::document::list_versions),
        )
        .route("/documents/{id}/grants", get(handlers::document::list_grants))
}

/// Download by path and comparison
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files/{*path}", get(handlers::file::download_by_path))
        .route("/compare", get(handlers::compare::compare))
}

/// Grant and revoke
fn share_routes() -> Router<AppState> {
    Router::new().route(
        "/share",
        post(handlers::share::share).delete(handlers::share::unshare),
    )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
