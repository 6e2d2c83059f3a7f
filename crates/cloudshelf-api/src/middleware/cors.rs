//! Cross-origin layer built from `CorsConfig`.

use std::str::FromStr;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tracing::warn;

use cloudshelf_core::config::CorsConfig;

/// Build the CORS layer. Entries that fail to parse are logged and skipped.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if CorsConfig::is_wildcard(&config.allowed_origins) {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(parse_all::<HeaderValue>(&config.allowed_origins, "origin"))
    };

    let headers = if CorsConfig::is_wildcard(&config.allowed_headers) {
        AllowHeaders::from(Any)
    } else {
        AllowHeaders::list(parse_all::<HeaderName>(&config.allowed_headers, "header"))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(parse_all::<Method>(&config.allowed_methods, "method"))
        .allow_headers(headers)
        .max_age(config.max_age())
}

fn parse_all<T: FromStr>(entries: &[String], what: &str) -> Vec<T> {
    entries
        .iter()
        .filter_map(|entry| match entry.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(entry = %entry, "Ignoring unparsable CORS {what}");
                None
            }
        })
        .collect()
}
