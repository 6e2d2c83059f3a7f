//! Collaborator traits defined in `cloudshelf-core` and implemented by
//! `cloudshelf-storage` (or by test doubles).

pub mod storage;
pub mod thumbnail;

pub use storage::ObjectStore;
pub use thumbnail::{ThumbnailKind, ThumbnailPipeline};
