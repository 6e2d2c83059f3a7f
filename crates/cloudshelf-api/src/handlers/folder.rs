//! Folder CRUD and tree handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use crate::dto::request::{CreateFolderRequest, DeleteFolderQuery, TreeQuery, UpdateFolderRequest};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/folders/tree?parent_id=...
pub async fn get_tree(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TreeQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let tree = state.tree_service.get_tree(&auth, query.parent_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": tree })))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folder_service.get_folder(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// GET /api/folders/{id}/breadcrumbs
pub async fn get_breadcrumbs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chain = state.folder_service.breadcrumbs(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": chain })))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    req.validate()?;

    let folder = state.folder_service.create_folder(&auth, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": folder })),
    ))
}

/// PUT /api/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()?;

    let folder = state
        .folder_service
        .update_folder(&auth, id, req.into())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// DELETE /api/folders/{id}?recursive=true
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteFolderQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state
        .folder_service
        .delete_folder(&auth, id, query.recursive)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "deleted_folders": deleted }
    })))
}
