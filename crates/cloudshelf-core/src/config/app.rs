//! HTTP listener and cross-origin settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Per-request deadline in seconds.
    pub request_timeout_seconds: u64,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_grace_seconds: u64,
    /// Largest accepted request body, which bounds one upload batch.
    pub max_upload_size_bytes: u64,
    /// Cross-origin policy.
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Drain window after a shutdown signal.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }

    /// Body limit as a `usize`, saturating on 32-bit targets.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_upload_size_bytes).unwrap_or(usize::MAX)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
            shutdown_grace_seconds: 10,
            max_upload_size_bytes: 100 * 1024 * 1024,
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin policy. A `"*"` entry allows anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed request headers.
    pub allowed_headers: Vec<String>,
    /// Preflight cache lifetime in seconds.
    pub max_age_seconds: u64,
}

impl CorsConfig {
    /// Whether `list` contains the wildcard.
    pub fn is_wildcard(list: &[String]) -> bool {
        list.iter().any(|entry| entry.trim() == "*")
    }

    /// Preflight cache lifetime.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                .map(String::from)
                .to_vec(),
            allowed_headers: vec!["*".to_string()],
            max_age_seconds: 3600,
        }
    }
}
