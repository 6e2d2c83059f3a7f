//! Convenience result type alias for CloudShelf.

use crate::error::AppError;

/// A specialized `Result` type for CloudShelf operations.
pub type AppResult<T> = Result<T, AppError>;
