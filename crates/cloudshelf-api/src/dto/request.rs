//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use cloudshelf_core::types::{FileSortField, SortDirection};
use cloudshelf_entity::file::{FileQuery, FileType, UpdateFile};
use cloudshelf_entity::folder::UpdateFolder;
use cloudshelf_service::{CreateFolderRequest as SvcCreateFolder, FolderTarget};

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder ID.
    pub parent_id: Option<Uuid>,
    /// Parent folder path, used when `parent_id` is absent.
    pub path: Option<String>,
    /// Display color.
    #[validate(length(max = 32))]
    pub color: Option<String>,
    /// Description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl From<CreateFolderRequest> for SvcCreateFolder {
    fn from(req: CreateFolderRequest) -> Self {
        Self {
            name: req.name,
            parent_id: req.parent_id,
            parent_path: req.path,
            color: req.color,
            description: req.description,
        }
    }
}

/// Update folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: Option<String>,
    /// New color.
    #[validate(length(max = 32))]
    pub color: Option<String>,
    /// New description.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl From<UpdateFolderRequest> for UpdateFolder {
    fn from(req: UpdateFolderRequest) -> Self {
        Self {
            name: req.name,
            color: req.color,
            description: req.description,
        }
    }
}

/// Query of `DELETE /api/folders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteFolderQuery {
    /// Delete subfolders too.
    #[serde(default)]
    pub recursive: bool,
}

/// Query of `GET /api/folders/tree`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeQuery {
    /// Folder to list below; the root when absent.
    pub parent_id: Option<Uuid>,
}

/// Query of `GET /api/content`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentQuery {
    /// Slash-delimited folder path; the root when absent.
    #[serde(default)]
    pub path: String,
    /// Page size.
    pub limit: Option<u32>,
    /// Rows to skip.
    pub offset: Option<u32>,
    /// Ordering column.
    pub sort_by: Option<FileSortField>,
    /// Ordering direction.
    pub sort_order: Option<SortDirection>,
    /// Only files of this type.
    pub file_type: Option<FileType>,
}

impl ContentQuery {
    /// The file listing parameters, with defaults filled in.
    pub fn file_query(&self) -> FileQuery {
        let defaults = FileQuery::default();
        FileQuery {
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
            sort_by: self.sort_by.unwrap_or(defaults.sort_by),
            sort_order: self.sort_order.unwrap_or(defaults.sort_order),
            file_type: self.file_type,
        }
    }
}

/// Update file request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New display name.
    #[validate(length(min = 1, max = 255))]
    pub display_filename: Option<String>,
    /// Star flag.
    pub is_starred: Option<bool>,
    /// Replacement tag list.
    #[validate(length(max = 50, message = "At most 50 tags"))]
    pub tags: Option<Vec<String>>,
}

impl From<UpdateFileRequest> for UpdateFile {
    fn from(req: UpdateFileRequest) -> Self {
        Self {
            display_filename: req.display_filename,
            is_starred: req.is_starred,
            tags: req.tags,
        }
    }
}

/// Move files request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MoveFilesRequest {
    /// Files to move.
    #[validate(length(min = 1, max = 1000, message = "file_ids must hold 1-1000 IDs"))]
    pub file_ids: Vec<Uuid>,
    /// Destination folder ID.
    pub target_folder_id: Option<Uuid>,
    /// Destination folder path, used when `target_folder_id` is absent.
    pub target_path: Option<String>,
}

impl MoveFilesRequest {
    /// The destination; the root when neither field is set.
    pub fn target(&self) -> FolderTarget {
        FolderTarget {
            folder_id: self.target_folder_id,
            path: self.target_path.clone(),
        }
    }
}

/// Delete files request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteFilesRequest {
    /// Files to delete.
    #[validate(length(min = 1, max = 1000, message = "file_ids must hold 1-1000 IDs"))]
    pub file_ids: Vec<Uuid>,
}

/// Signature parameters of a signed object URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedObjectQuery {
    /// Expiry (unix seconds).
    pub expires: i64,
    /// Hex HMAC signature.
    pub signature: String,
}
