//! Object store providers.

pub mod local;
pub mod memory;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;

/// Reject bucket names and object paths that could escape their root.
pub(crate) fn validate_key(bucket: &str, path: &str) -> AppResult<()> {
    let bad_bucket = bucket.is_empty() || bucket.contains(['/', '\\']) || bucket.starts_with('.');
    if bad_bucket {
        return Err(AppError::validation(format!("Invalid bucket name: {bucket}")));
    }

    let trimmed = path.trim_start_matches('/');
    let bad_path = trimmed.is_empty()
        || trimmed.contains('\\')
        || trimmed
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if bad_path {
        return Err(AppError::validation(format!("Invalid object path: {path}")));
    }

    Ok(())
}
