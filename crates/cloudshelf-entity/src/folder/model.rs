//! Logical folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use cloudshelf_core::error::AppError;

/// Name of the system root created for every owner.
pub const ROOT_FOLDER_NAME: &str = "My Files";
/// `full_path` of the root folder.
pub const ROOT_PATH: &str = "/";
/// Deepest allowed folder depth (root is 0).
pub const MAX_DEPTH: i32 = 10;
/// Longest allowed folder name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// A user-visible directory node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LogicalFolder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (null only for the owner's root).
    pub parent_id: Option<Uuid>,
    /// Materialized path built from ancestor names (`/Trips/Paris`).
    pub full_path: String,
    /// Depth in the folder tree (0 for the root).
    pub depth: i32,
    /// Marks the auto-created root; system folders are immutable.
    pub is_system: bool,
    /// Optional display color.
    pub color: Option<String>,
    /// Optional free-text description.
    pub description: Option<String>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LogicalFolder {
    /// Check if this is the owner's root folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to insert a folder row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder (None only for the root).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Materialized path.
    pub full_path: String,
    /// Depth in the tree.
    pub depth: i32,
    /// Whether this is a system folder.
    pub is_system: bool,
    /// Display color.
    pub color: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// A partial update of a folder's user-editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolder {
    /// New name.
    pub name: Option<String>,
    /// New display color.
    pub color: Option<String>,
    /// New description.
    pub description: Option<String>,
}

impl UpdateFolder {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.description.is_none()
    }
}

/// Validate a folder name and return it trimmed.
pub fn validate_folder_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Folder name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(AppError::validation(
            "Folder name cannot contain path separators",
        ));
    }

    Ok(trimmed.to_string())
}

/// Build the materialized path of a child folder.
pub fn child_path(parent_path: &str, name: &str) -> String {
    if parent_path == ROOT_PATH {
        format!("/{name}")
    } else {
        format!("{parent_path}/{name}")
    }
}
