//! # cloudshelf-service
//!
//! Business logic for CloudShelf. Each service orchestrates the
//! repositories, the storage folder allocator, the object store, and the
//! thumbnail pipeline to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod content;
pub mod context;
pub mod file;
pub mod folder;
pub mod storage;

pub use content::{ContentService, FolderContent};
pub use context::RequestContext;
pub use file::{
    DeleteSummary, FileService, FileView, LinkSigner, MAX_FILE_IDS_PER_REQUEST, MoveSummary,
    UploadItem, UploadOutcome, UploadService,
};
pub use folder::{CreateFolderRequest, FolderService, FolderTarget, PathResolver, TreeService};
pub use storage::StorageAllocator;
