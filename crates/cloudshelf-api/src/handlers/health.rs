//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse, HealthStatus};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database_ok = match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let storage_ok = match state.store.health_check().await {
        Ok(reachable) => reachable,
        Err(e) => {
            tracing::warn!(error = %e, "Object store health check failed");
            false
        }
    };

    let status = if database_ok && storage_ok {
        HealthStatus::Ok
    } else {
        HealthStatus::Degraded
    };

    Json(ApiResponse::ok(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_ok { "connected" } else { "unavailable" }.to_string(),
        storage: if storage_ok { "available" } else { "unavailable" }.to_string(),
        storage_provider: state.store.provider_type().to_string(),
    }))
}
