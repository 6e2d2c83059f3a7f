//! Thumbnail generator backed by the `image` crate.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;

use cloudshelf_core::config::UploadConfig;
use cloudshelf_core::error::{AppError, ErrorKind};
use cloudshelf_core::result::AppResult;
use cloudshelf_core::traits::thumbnail::{ThumbnailKind, ThumbnailPipeline};

/// Produces JPEG thumbnails bounded by a square box.
#[derive(Debug, Clone)]
pub struct ImageThumbnailer {
    /// Longest edge of the output in pixels.
    max_dimension: u32,
    /// JPEG quality (1-100).
    quality: u8,
}

impl ImageThumbnailer {
    /// Create a thumbnailer with explicit bounds.
    pub fn new(max_dimension: u32, quality: u8) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// Create a thumbnailer from upload settings.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.thumbnail_max_dimension, config.thumbnail_quality)
    }

    /// Decode, shrink to fit, and re-encode as JPEG.
    ///
    /// Images already inside the box keep their size.
    fn render(data: &[u8], max_dimension: u32, quality: u8) -> AppResult<Bytes> {
        let img = image::load_from_memory(data).map_err(|e| {
            AppError::with_source(ErrorKind::Thumbnail, "Failed to decode image", e)
        })?;

        let img = if img.width() > max_dimension || img.height() > max_dimension {
            img.thumbnail(max_dimension, max_dimension)
        } else {
            img
        };

        let rgb = img.to_rgb8();
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode_image(&rgb)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Thumbnail, "Failed to encode thumbnail", e)
            })?;

        Ok(Bytes::from(buffer))
    }
}

#[async_trait]
impl ThumbnailPipeline for ImageThumbnailer {
    async fn generate(&self, kind: ThumbnailKind, data: Bytes) -> AppResult<Bytes> {
        match kind {
            ThumbnailKind::Image => {}
            ThumbnailKind::Heic => {
                return Err(AppError::thumbnail("HEIC decoding is not available"));
            }
            ThumbnailKind::None => {
                return Err(AppError::thumbnail("File type has no thumbnail"));
            }
        }
        if data.is_empty() {
            return Err(AppError::thumbnail("Empty image data"));
        }

        let max_dimension = self.max_dimension;
        let quality = self.quality;
        let thumbnail =
            tokio::task::spawn_blocking(move || Self::render(&data, max_dimension, quality))
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e)
                })??;

        tracing::debug!(bytes = thumbnail.len(), max_dimension, "Generated thumbnail");
        Ok(thumbnail)
    }
}
