//! # cloudshelf-entity
//!
//! Domain entity models for CloudShelf. Every struct in this crate is
//! either a database row (deriving `sqlx::FromRow`) or a value object
//! passed between the repositories and the services.
//!
//! Derived strings (`storage_path`, `file_path`, `thumbnail_path`) are
//! produced here by pure functions so that any tool can reproduce them
//! from their inputs.

pub mod file;
pub mod folder;
pub mod storage;
