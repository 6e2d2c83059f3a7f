//! Embedded schema migrations.

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use tracing::info;

use cloudshelf_core::error::{AppError, ErrorKind};

/// Migrations compiled in from `migrations/` at the workspace root.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Apply every migration not yet recorded in `_sqlx_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    info!(known = MIGRATOR.iter().count(), "Applying schema migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
    })?;

    info!("Schema is up to date");
    Ok(())
}
