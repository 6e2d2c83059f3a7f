//! Offset-based pagination for listings.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 50;
/// Maximum page size.
pub const MAX_LIMIT: u32 = 200;

/// A `LIMIT`/`OFFSET` window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWindow {
    /// Number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: u32,
}

impl ListWindow {
    /// Create a window, clamping the limit into `1..=MAX_LIMIT`.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Return a copy with the limit clamped.
    pub fn clamped(self) -> Self {
        Self::new(self.limit, self.offset)
    }

    /// The SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// The SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        i64::from(self.offset)
    }
}

impl Default for ListWindow {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
