//! Physical storage folder allocation.

pub mod allocator;

pub use allocator::StorageAllocator;
