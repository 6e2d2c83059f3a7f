//! Logical folder tree: path resolution, CRUD, and tree listing.

pub mod resolver;
pub mod service;
pub mod tree;

pub use resolver::{FolderTarget, PathResolver, normalize_path};
pub use service::{CreateFolderRequest, FolderService};
pub use tree::TreeService;
