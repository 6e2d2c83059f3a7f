//! Uploaded file entities.

pub mod model;
pub mod naming;
pub mod query;

pub use model::{CreateUploadedFile, FileType, UpdateFile, UploadStatus, UploadedFile};
pub use naming::{file_path, sanitize_filename, stored_filename, thumbnail_path};
pub use query::FileQuery;
