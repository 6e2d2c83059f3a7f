//! Content listing handler.

use axum::Json;
use axum::extract::{Query, State};

use crate::dto::request::ContentQuery;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/content?path=...
pub async fn get_content(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ContentQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content = state
        .content_service
        .resolve_content(&auth, &query.path, &query.file_query())
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": content })))
}
