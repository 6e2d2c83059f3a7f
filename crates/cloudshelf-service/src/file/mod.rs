//! File services: upload pipeline, reads, edits, moves, and deletes.

pub mod service;
pub mod upload;
pub mod view;

pub use service::{DeleteSummary, FileService, MAX_FILE_IDS_PER_REQUEST, MoveSummary};
pub use upload::{UploadFailure, UploadItem, UploadOutcome, UploadService};
pub use view::{FileView, LinkSigner};
