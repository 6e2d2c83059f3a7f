//! Listing parameters for files in a logical folder.

use serde::{Deserialize, Serialize};

use cloudshelf_core::types::{FileSortField, ListWindow, SortDirection};
use cloudshelf_core::types::pagination::DEFAULT_LIMIT;

use super::model::FileType;

/// Filtering, ordering, and paging of a folder's files.
///
/// Defaults to the 50 newest files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileQuery {
    /// Page size.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Rows to skip.
    #[serde(default)]
    pub offset: u32,
    /// Ordering column.
    #[serde(default)]
    pub sort_by: FileSortField,
    /// Ordering direction.
    #[serde(default)]
    pub sort_order: SortDirection,
    /// Only files of this type.
    #[serde(default)]
    pub file_type: Option<FileType>,
}

impl FileQuery {
    /// The clamped paging window.
    pub fn window(&self) -> ListWindow {
        ListWindow::new(self.limit, self.offset)
    }
}

impl Default for FileQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_by: FileSortField::default(),
            sort_order: SortDirection::default(),
            file_type: None,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
