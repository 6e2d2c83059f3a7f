//! List query types shared by repositories, services, and the API.

pub mod pagination;
pub mod sorting;

pub use pagination::ListWindow;
pub use sorting::{FileSortField, SortDirection};
