//! Storage usage handler.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/storage/usage
pub async fn get_usage(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let usage = state.allocator.usage(&auth).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": usage })))
}
