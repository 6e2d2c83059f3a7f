//! # cloudshelf-database
//!
//! SQLite connection management, embedded migrations, and the repositories
//! for logical folders, storage folders, and uploaded files.

pub mod connection;
pub mod errors;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use errors::is_unique_violation;
