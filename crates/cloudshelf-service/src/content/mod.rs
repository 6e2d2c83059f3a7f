//! Browsing a logical folder by path.

pub mod service;

pub use service::{ContentService, FolderContent};
