//! Mapping helpers from sqlx errors into `AppError`.

use cloudshelf_core::error::{AppError, ErrorKind};

/// Whether a sqlx error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || db_err.message().to_ascii_lowercase().contains("unique")
        }
        _ => false,
    }
}

/// Wrap a sqlx error as a database `AppError`.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}
