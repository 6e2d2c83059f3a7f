//! HTTP request handlers, one module per resource.

pub mod content;
pub mod file;
pub mod folder;
pub mod health;
pub mod object;
pub mod storage;
