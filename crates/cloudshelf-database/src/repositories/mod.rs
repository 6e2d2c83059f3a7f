//! Repository implementations for CloudShelf entities.
//!
//! Every query filters on `owner_id`; no repository method reads or
//! writes rows across owners.

pub mod file;
pub mod folder;
pub mod storage_folder;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use storage_folder::StorageFolderRepository;
