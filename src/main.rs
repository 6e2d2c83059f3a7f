//! CloudShelf server: personal cloud file manager.
//!
//! Main entry point that wires all crates together and starts the server.

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use cloudshelf_core::config::{AppConfig, LogFormat};
use cloudshelf_database::DatabasePool;
use cloudshelf_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> anyhow::Result<AppConfig> {
    let env = std::env::var("CLOUDSHELF_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&env).with_context(|| format!("loading configuration (env: {env})"))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting CloudShelf v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database)
        .await
        .context("connecting to database")?;
    run_migrations(db.pool())
        .await
        .context("running migrations")?;

    // ── Step 3: Serve ────────────────────────────────────────────
    cloudshelf_api::run_server(config, db.into_pool())
        .await
        .context("running HTTP server")?;

    Ok(())
}

/// Create the object root and the directory holding the SQLite file.
async fn create_data_directories(config: &AppConfig) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.storage.root_path)
        .await
        .with_context(|| format!("creating object root '{}'", config.storage.root_path))?;

    let db_file = config
        .database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if let Some(parent) = Path::new(db_file).parent() {
        if !parent.as_os_str().is_empty() && !db_file.starts_with(':') {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating database directory '{}'", parent.display()))?;
        }
    }

    Ok(())
}
