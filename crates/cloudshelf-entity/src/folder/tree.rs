//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in a folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Full path.
    pub path: String,
    /// Nesting level relative to the listed parent (direct children are 1).
    pub level: i32,
    /// Display color.
    pub color: Option<String>,
    /// Number of child folders.
    pub subfolder_count: u64,
    /// Number of completed files in this folder.
    pub file_count: u64,
    /// Child folder nodes, sorted by name.
    pub children: Vec<FolderNode>,
}

/// The descendants of one parent folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    /// The folder the tree hangs from.
    pub parent_id: Uuid,
    /// Top-level nodes.
    pub roots: Vec<FolderNode>,
    /// Total number of folders in the tree.
    pub total_folders: u64,
}

impl FolderTree {
    /// Create an empty folder tree.
    pub fn empty(parent_id: Uuid) -> Self {
        Self {
            parent_id,
            roots: Vec::new(),
            total_folders: 0,
        }
    }
}
