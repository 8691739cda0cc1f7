//! Download by virtual path.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use docvault_core::error::AppError;

use crate::dto::request::DownloadQuery;
use crate::error::ApiError;
use crate::extractors::MaybeAuthUser;
use crate::state::AppState;

/// GET /api/files/{*path}?revision=N&token=T
pub async fn download_by_path(
    State(state): State<AppState>,
    MaybeAuthUser(ctx): MaybeAuthUser,
    Path(path): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let virtual_path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };

    let download = state
        .query_service
        .download_by_path(ctx.map(|c| c.principal_id), &virtual_path, query.revision)
        .await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.node.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&download.node.name),
        )
        .header(header::CONTENT_LENGTH, download.data.len())
        .header(header::ETAG, format!("\"{}\"", download.node.checksum))
        .body(Body::from(download.data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// `Content-Disposition` for a stored display name. Characters that cannot
/// appear in a quoted header value are dropped.
fn attachment_disposition(name: &str) -> String {
    let filename: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{filename}\"")
}
