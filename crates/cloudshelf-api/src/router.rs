//! Route definitions for the CloudShelf HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with every route mounted under `/api`.
///
/// Cross-cutting layers are added by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.server.body_limit();

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(content_routes())
        .merge(folder_routes())
        .merge(file_routes())
        .merge(storage_routes())
        .merge(object_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Health probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Folder content by path
fn content_routes() -> Router<AppState> {
    Router::new().route("/content", get(handlers::content::get_content))
}

/// Logical folder CRUD and tree
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route("/folders/tree", get(handlers::folder::get_tree))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route(
            "/folders/{id}/breadcrumbs",
            get(handlers::folder::get_breadcrumbs),
        )
}

/// File upload, edit, move, delete
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(handlers::file::upload_files))
        .route("/files/move", post(handlers::file::move_files))
        .route("/files/delete", post(handlers::file::delete_files))
        .route(
            "/files/{id}",
            get(handlers::file::get_file).patch(handlers::file::update_file),
        )
}

/// Storage statistics
fn storage_routes() -> Router<AppState> {
    Router::new().route("/storage/usage", get(handlers::storage::get_usage))
}

/// Signed object downloads (no bearer token)
fn object_routes() -> Router<AppState> {
    Router::new().route(
        "/objects/{bucket}/{*path}",
        get(handlers::object::get_object),
    )
}
