//! Uploaded file entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Coarse classification derived from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// `image/*`.
    Image,
    /// `video/*`.
    Video,
    /// PDFs, office documents, and text.
    Document,
    /// Anything else.
    Other,
}

impl FileType {
    /// Classify a MIME type.
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.contains("pdf") || mime.contains("document") || mime.starts_with("text/")
        {
            Self::Document
        } else {
            Self::Other
        }
    }
}

/// Lifecycle of an uploaded file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Bytes are still being transferred.
    Uploading,
    /// Bytes and metadata are durable; the file is listable.
    Completed,
    /// The upload failed.
    Failed,
}

/// Metadata bridging a file's logical location and its physical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UploadedFile {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file owner.
    pub owner_id: Uuid,
    /// Current logical folder. Changes on move.
    pub folder_id: Uuid,
    /// Physical storage folder chosen at upload time. Write-once.
    pub storage_folder_id: Uuid,
    /// Name as uploaded by the client.
    pub original_filename: String,
    /// Collision-resistant generated name.
    pub stored_filename: String,
    /// User-editable label.
    pub display_filename: String,
    /// Object key in the originals bucket. Write-once.
    pub file_path: String,
    /// Bucket holding the original bytes.
    pub storage_bucket: String,
    /// Size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Classification derived from the MIME type.
    pub file_type: FileType,
    /// Whether a thumbnail was stored.
    pub has_thumbnail: bool,
    /// Object key in the thumbnails bucket.
    pub thumbnail_path: Option<String>,
    /// Thumbnail size in bytes.
    pub thumbnail_size: Option<i64>,
    /// Upload lifecycle state.
    pub upload_status: UploadStatus,
    /// Starred by the owner.
    pub is_starred: bool,
    /// Free-form tags.
    pub tags: Json<Vec<String>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UploadedFile {
    /// Whether the file may appear in listings.
    pub fn is_listable(&self) -> bool {
        self.upload_status == UploadStatus::Completed
    }
}

/// Data required to insert a file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUploadedFile {
    /// The file owner.
    pub owner_id: Uuid,
    /// Target logical folder.
    pub folder_id: Uuid,
    /// Allocated storage folder.
    pub storage_folder_id: Uuid,
    /// Name as uploaded.
    pub original_filename: String,
    /// Generated name.
    pub stored_filename: String,
    /// Object key of the original.
    pub file_path: String,
    /// Bucket holding the original.
    pub storage_bucket: String,
    /// Size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub mime_type: String,
    /// Object key of the thumbnail, when one was stored.
    pub thumbnail_path: Option<String>,
    /// Thumbnail size in bytes.
    pub thumbnail_size: Option<i64>,
}

/// A partial update of a file's user-editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFile {
    /// New display label.
    pub display_filename: Option<String>,
    /// New starred flag.
    pub is_starred: Option<bool>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
}
