//! Thumbnail generation.

pub mod generator;
