//! Thumbnail pipeline contract.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Which codec path a file needs for its thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailKind {
    /// A raster format the image codec decodes directly.
    Image,
    /// HEIC/HEIF photos, which need a dedicated decoder.
    Heic,
    /// No thumbnail is produced.
    None,
}

impl ThumbnailKind {
    /// Classify a file by its extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Self {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return Self::None;
        };

        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "tiff" | "tif" => Self::Image,
            "heic" | "heif" => Self::Heic,
            _ => Self::None,
        }
    }

    /// Whether the upload pipeline must produce a thumbnail.
    pub fn requires_thumbnail(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Turns source bytes into an encoded thumbnail.
#[async_trait]
pub trait ThumbnailPipeline: Send + Sync + std::fmt::Debug + 'static {
    /// Classify a file name. The default uses the extension table.
    fn classify(&self, filename: &str) -> ThumbnailKind {
        ThumbnailKind::from_filename(filename)
    }

    /// MIME type of the buffers `generate` returns.
    fn output_content_type(&self) -> &str {
        "image/jpeg"
    }

    /// Encode a thumbnail. Any failure is reported as `ErrorKind::Thumbnail`.
    async fn generate(&self, kind: ThumbnailKind, data: Bytes) -> AppResult<Bytes>;
}
