//! Physical storage-folder entities.

pub mod model;

pub use model::{StorageFolder, StorageUsage, storage_path};
