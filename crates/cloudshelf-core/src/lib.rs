//! # cloudshelf-core
//!
//! Core crate for CloudShelf. Contains the configuration schema, the
//! collaborator traits (object store, thumbnail pipeline), list query
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CloudShelf crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
