//! Logical folder domain entities.

pub mod model;
pub mod tree;

pub use model::{
    CreateFolder, LogicalFolder, MAX_DEPTH, MAX_NAME_LENGTH, ROOT_FOLDER_NAME, ROOT_PATH,
    UpdateFolder, child_path, validate_folder_name,
};
pub use tree::{FolderNode, FolderTree};
