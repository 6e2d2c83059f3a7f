//! Object storage and physical allocation configuration.

use serde::{Deserialize, Serialize};

/// Object store layout and storage-folder capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the local object store.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Bucket holding original file bytes.
    #[serde(default = "default_originals_bucket")]
    pub originals_bucket: String,
    /// Bucket holding generated thumbnails.
    #[serde(default = "default_thumbnails_bucket")]
    pub thumbnails_bucket: String,
    /// Capacity of every newly created storage folder.
    #[serde(default = "default_max_files_per_folder")]
    pub max_files_per_folder: i64,
    /// Base URL signed object links are rooted at.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// HMAC secret for signed object links.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
    /// Lifetime of signed object links in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            originals_bucket: default_originals_bucket(),
            thumbnails_bucket: default_thumbnails_bucket(),
            max_files_per_folder: default_max_files_per_folder(),
            public_base_url: default_public_base_url(),
            signing_secret: default_signing_secret(),
            signed_url_ttl_seconds: default_signed_url_ttl(),
        }
    }
}

fn default_root_path() -> String {
    "data/objects".to_string()
}

fn default_originals_bucket() -> String {
    "originals".to_string()
}

fn default_thumbnails_bucket() -> String {
    "thumbnails".to_string()
}

fn default_max_files_per_folder() -> i64 {
    1000
}

fn default_public_base_url() -> String {
    "http://localhost:8080/api/objects".to_string()
}

fn default_signing_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_signed_url_ttl() -> u64 {
    3600
}
