//! Upload pipeline configuration.

use serde::{Deserialize, Serialize};

/// Batch and thumbnail settings for the upload pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Files processed concurrently within one batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches, in milliseconds.
    #[serde(default = "default_batch_pause")]
    pub batch_pause_ms: u64,
    /// Longest thumbnail edge in pixels.
    #[serde(default = "default_thumbnail_max_dimension")]
    pub thumbnail_max_dimension: u32,
    /// JPEG quality of generated thumbnails (1-100).
    #[serde(default = "default_thumbnail_quality")]
    pub thumbnail_quality: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause(),
            thumbnail_max_dimension: default_thumbnail_max_dimension(),
            thumbnail_quality: default_thumbnail_quality(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_pause() -> u64 {
    100
}

fn default_thumbnail_max_dimension() -> u32 {
    200
}

fn default_thumbnail_quality() -> u8 {
    80
}
