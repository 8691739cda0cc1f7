//! Document upload, listing and detail handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use bytes::Bytes;

use docvault_core::error::AppError;
use docvault_core::types::NodeId;
use docvault_entity::node::VersionNode;
use docvault_service::UploadRequest;
use docvault_service::document::{DocumentDetail, SharedDocument};
use docvault_service::share::GrantSummary;

use crate::dto::response::{ApiResponse, UploadResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/documents (multipart: file, virtual_path, notes?, name?)
pub async fn upload_document(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut virtual_path: Option<String> = None;
    let mut notes: Option<String> = None;
    let mut name: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(String::from);
                mime_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            "virtual_path" | "notes" | "name" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                match field_name.as_str() {
                    "virtual_path" => virtual_path = Some(text),
                    "notes" => notes = Some(text),
                    _ => name = Some(text),
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("No file submitted"))?;
    let virtual_path =
        virtual_path.ok_or_else(|| AppError::validation("A virtual path is required"))?;
    let name = name
        .filter(|n| !n.trim().is_empty())
        .or(file_name)
        .ok_or_else(|| AppError::validation("A file name is required"))?;

    let node = state
        .upload_service
        .upload(
            &auth,
            UploadRequest {
                virtual_path,
                name,
                data,
                notes,
                mime_type,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(node))))
}

/// GET /api/documents
pub async fn list_owned(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<VersionNode>>>, ApiError> {
    let documents = state.query_service.list_owned(&auth).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

/// GET /api/documents/shared
pub async fn list_shared(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SharedDocument>>>, ApiError> {
    let documents = state.query_service.list_shared_with_me(&auth).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<DocumentDetail>>, ApiError> {
    let detail = state.query_service.get_detail(&auth, id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// GET /api/documents/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<Vec<VersionNode>>>, ApiError> {
    let versions = state.query_service.list_versions(&auth, id).await?;
    Ok(Json(ApiResponse::ok(versions)))
}

/// GET /api/documents/{id}/grants
pub async fn list_grants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<NodeId>,
) -> Result<Json<ApiResponse<Vec<GrantSummary>>>, ApiError> {
    let grants = state.sharing_service.list_grants(&auth, id).await?;
    Ok(Json(ApiResponse::ok(grants)))
}
