//! # cloudshelf-storage
//!
//! Object store providers (local filesystem, in-memory), HMAC-signed
//! object URLs, and the image-based thumbnail pipeline.

pub mod providers;
pub mod signing;
pub mod thumbnail;

pub use providers::local::LocalObjectStore;
pub use providers::memory::MemoryObjectStore;
pub use signing::UrlSigner;
pub use thumbnail::generator::ImageThumbnailer;
