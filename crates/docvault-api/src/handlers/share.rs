//! Share and unshare handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use docvault_core::error::AppError;
use docvault_service::share::ShareRequest as GrantRequest;

use crate::dto::request::{ShareRequest, UnshareRequest};
use crate::dto::response::{ShareResponse, UnshareResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/share
pub async fn share(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Validation error: {e}")))?;

    let permissions = state
        .sharing_service
        .grant(
            &auth,
            GrantRequest {
                node_id: req.file_id,
                target_email: req.user_email.clone(),
                can_edit: req.can_edit,
            },
        )
        .await?;

    let access = if permissions.edit { "view and edit" } else { "view" };
    Ok(Json(ShareResponse {
        message: format!("Shared with {} ({access})", req.user_email),
        permissions,
    }))
}

/// DELETE /api/share
pub async fn unshare(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UnshareRequest>,
) -> Result<Json<UnshareResponse>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Validation error: {e}")))?;

    let removed = state
        .sharing_service
        .revoke(&auth, req.file_id, &req.user_email)
        .await?;

    Ok(Json(UnshareResponse {
        message: format!("Access for {} revoked", req.user_email),
        removed,
    }))
}
