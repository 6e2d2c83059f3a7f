//! Unified application error types for CloudShelf.
//!
//! Every crate maps its internal failures into [`AppError`] so that the
//! `?` operator carries one error type from the repositories up to the
//! HTTP boundary.

use std::fmt;
use thiserror::Error;

/// Error categories shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No valid identity was supplied.
    Unauthorized,
    /// The resource belongs to another owner, or is a system folder.
    PermissionDenied,
    /// A path, folder, or file does not resolve.
    NotFound,
    /// Malformed input (bad name, oversized name, bad query).
    Validation,
    /// A sibling folder already uses the name.
    DuplicateName,
    /// The folder would be deeper than the tree allows.
    DepthExceeded,
    /// The folder still holds files.
    NotEmpty,
    /// The folder still holds sub-folders.
    HasChildren,
    /// A state conflict, such as a storage folder at capacity.
    Conflict,
    /// Two allocations raced to create the same storage folder.
    CapacityRace,
    /// The object store or another remote collaborator failed.
    Upstream,
    /// Thumbnail generation failed for a file that requires one.
    Thumbnail,
    /// A datastore error.
    Database,
    /// A storage I/O error.
    Storage,
    /// A configuration error.
    Configuration,
    /// A serialization/deserialization error.
    Serialization,
    /// An internal error.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl ErrorKind {
    /// Machine-readable code used in logs and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION_ERROR",
            Self::DuplicateName => "DUPLICATE_NAME",
            Self::DepthExceeded => "DEPTH_EXCEEDED",
            Self::NotEmpty => "NOT_EMPTY",
            Self::HasChildren => "HAS_CHILDREN",
            Self::Conflict => "CONFLICT",
            Self::CapacityRace => "CAPACITY_RACE",
            Self::Upstream => "UPSTREAM_FAILURE",
            Self::Thumbnail => "THUMBNAIL_FAILURE",
            Self::Database => "DATABASE",
            Self::Storage => "STORAGE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }
}

/// The unified application error used throughout CloudShelf.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a duplicate-name error.
    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName, message)
    }

    /// Create a depth-exceeded error.
    pub fn depth_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DepthExceeded, message)
    }

    /// Create a not-empty error.
    pub fn not_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotEmpty, message)
    }

    /// Create a has-children error.
    pub fn has_children(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::HasChildren, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a capacity-race error. Never leaves the allocator.
    pub fn capacity_race(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapacityRace, message)
    }

    /// Create an upstream failure.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upstream, message)
    }

    /// Create a thumbnail failure.
    pub fn thumbnail(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Thumbnail, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is the allocator's lost-race signal.
    pub fn is_retryable_race(&self) -> bool {
        self.kind == ErrorKind::CapacityRace
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
