//! Application builder: router, middleware layers, and the server loop.

use std::future::IntoFuture;
use std::sync::Arc;

use axum::Router;
use axum::middleware as axum_middleware;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use cloudshelf_core::config::AppConfig;
use cloudshelf_core::error::{AppError, ErrorKind};
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_core::traits::thumbnail::ThumbnailPipeline;
use cloudshelf_storage::{ImageThumbnailer, LocalObjectStore, UrlSigner};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();

    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(build_compression_layer())
        .layer(build_cors_layer(&server.cors))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
}

/// Runs the CloudShelf server with the given configuration and database pool.
pub async fn run_server(config: AppConfig, db_pool: SqlitePool) -> Result<(), AppError> {
    info!("Starting CloudShelf server...");

    // ── Step 1: Object store ─────────────────────────────────────
    let signer = UrlSigner::new(
        &config.storage.signing_secret,
        &config.storage.public_base_url,
    );
    let store: Arc<dyn ObjectStore> =
        Arc::new(LocalObjectStore::new(&config.storage.root_path, signer).await?);
    info!(
        provider = store.provider_type(),
        root = %config.storage.root_path,
        "Object store ready"
    );

    // ── Step 2: Thumbnail pipeline ───────────────────────────────
    let thumbnails: Arc<dyn ThumbnailPipeline> =
        Arc::new(ImageThumbnailer::from_config(&config.upload));

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let grace = config.server.shutdown_grace();

    let state = AppState::new(config, db_pool.clone(), store, thumbnails);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;

    info!("CloudShelf server listening on {}", addr);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let grace_elapsed = async move {
        if shutdown_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Server error", e)
            })?;
        }
        _ = grace_elapsed => {
            warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed; dropping open connections");
        }
    }

    db_pool.close().await;
    info!("CloudShelf server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
