//! File upload, read, edit, move, and delete handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use uuid::Uuid;
use validator::Validate;

use cloudshelf_core::error::AppError;
use cloudshelf_service::{FolderTarget, UploadItem};

use crate::dto::request::{DeleteFilesRequest, MoveFilesRequest, UpdateFileRequest};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/files/upload (multipart, one or more `files` parts)
///
/// The target folder comes from an optional `folder_id` or `path` text
/// part; the root is used when neither is sent.
pub async fn upload_files(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut target = FolderTarget::default();
    let mut items = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    target.folder_id = Some(
                        Uuid::parse_str(text)
                            .map_err(|_| AppError::validation("Invalid folder_id"))?,
                    );
                }
            }
            "path" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                target.path = Some(text);
            }
            "files" | "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                items.push(UploadItem {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    if items.is_empty() {
        return Err(AppError::validation("At least one file is required").into());
    }

    let outcomes = state
        .upload_service
        .upload_batch(&auth, &target, items)
        .await?;
    let uploaded = outcomes.iter().filter(|o| o.success).count();

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "uploaded": uploaded,
            "failed": outcomes.len() - uploaded,
            "results": outcomes,
        }
    })))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let file = state.file_service.get_file(&auth, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// PATCH /api/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()?;

    let file = state.file_service.update_file(&auth, id, req.into()).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": file })))
}

/// POST /api/files/move
pub async fn move_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<MoveFilesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()?;

    let summary = state
        .file_service
        .move_files(&auth, &req.file_ids, &req.target())
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": summary })))
}

/// POST /api/files/delete
pub async fn delete_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DeleteFilesRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()?;

    let summary = state.file_service.delete_files(&auth, &req.file_ids).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": summary })))
}
