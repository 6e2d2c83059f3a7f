//! Signed object download handler.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use chrono::Utc;

use cloudshelf_core::error::AppError;

use crate::dto::request::SignedObjectQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/objects/{bucket}/{*path}?expires=...&signature=...
///
/// No bearer token; the URL signature is the credential.
pub async fn get_object(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
    Query(query): Query<SignedObjectQuery>,
) -> Result<Response, ApiError> {
    state
        .url_signer
        .verify(&bucket, &path, query.expires, &query.signature, Utc::now())?;

    let data = state.store.get(&bucket, &path).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&path))
        .header(header::CONTENT_LENGTH, data.len())
        .header(header::CACHE_CONTROL, "private, max-age=300")
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// Content type guessed from the object's extension.
fn content_type_for(path: &str) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
