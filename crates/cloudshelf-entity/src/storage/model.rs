//! Storage folder entity model.
//!
//! A storage folder is a capacity-bounded slice of the originals bucket.
//! Owners never see it; uploads are packed into the active one until it
//! fills, then a new one with the next index is opened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A physical allocation unit in the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StorageFolder {
    /// Unique storage folder identifier.
    pub id: Uuid,
    /// The owner whose uploads live here.
    pub owner_id: Uuid,
    /// Zero-based, per-owner, monotonically increasing index.
    pub folder_index: i64,
    /// Cached `storage_path(owner_id, folder_index)`.
    pub storage_path: String,
    /// Number of files accounted to this folder.
    pub file_count: i64,
    /// Slots held by uploads that have not been recorded yet.
    pub reserved_count: i64,
    /// Capacity of this folder.
    pub max_file_count: i64,
    /// Bytes accounted to this folder.
    pub total_size: i64,
    /// `file_count + reserved_count < max_file_count`.
    pub is_active: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the counters last changed.
    pub updated_at: DateTime<Utc>,
}

impl StorageFolder {
    /// Capacity not yet claimed by stored or in-flight files.
    pub fn free_slots(&self) -> i64 {
        (self.max_file_count - self.file_count - self.reserved_count).max(0)
    }

    /// The path this folder should have, derived from its identity.
    pub fn expected_path(&self) -> String {
        storage_path(self.owner_id, self.folder_index)
    }
}

/// Aggregate storage statistics for one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageUsage {
    /// The owner.
    pub owner_id: Uuid,
    /// Every storage folder, ordered by index.
    pub folders: Vec<StorageFolder>,
    /// Sum of `file_count`.
    pub total_files: i64,
    /// Sum of `total_size`.
    pub total_bytes: i64,
}

/// Derive the object-store prefix of a storage folder.
pub fn storage_path(owner_id: Uuid, folder_index: i64) -> String {
    format!("{owner_id}/folder_{folder_index:03}")
}
