//! Response envelopes.

use serde::{Deserialize, Serialize};

/// `{"success": true, "data": ...}` envelope for typed payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Always `true`; failures use `ApiErrorResponse`.
    pub success: bool,
    /// Payload.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Database and object store both respond.
    Ok,
    /// At least one dependency is unreachable.
    Degraded,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall state.
    pub status: HealthStatus,
    /// Crate version.
    pub version: String,
    /// `"connected"` or `"unavailable"`.
    pub database: String,
    /// `"available"` or `"unavailable"`.
    pub storage: String,
    /// Object store backend, e.g. `"local"`.
    pub storage_provider: String,
}
