//! Side-by-side comparison handler.

use axum::Json;
use axum::extract::{Query, State};

use docvault_core::error::AppError;
use docvault_service::document::Comparison;

use crate::dto::request::CompareQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/compare?left_id=..&right_id=..
pub async fn compare(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<Comparison>>, ApiError> {
    let (Some(left_id), Some(right_id)) = (query.left_id, query.right_id) else {
        return Err(AppError::validation("Both left_id and right_id are required").into());
    };

    let comparison = state.query_service.compare(&auth, left_id, right_id).await?;
    Ok(Json(ApiResponse::ok(comparison)))
}
