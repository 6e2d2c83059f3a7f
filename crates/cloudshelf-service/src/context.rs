//! The owner identity every service call is scoped to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated owner of the current request.
///
/// Every repository query issued on behalf of a request filters by
/// `owner_id`; services never see rows of other owners except to tell
/// `PermissionDenied` apart from `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The owner whose tree and storage the request touches.
    pub owner_id: Uuid,
}

impl RequestContext {
    /// Context for a verified owner.
    pub fn new(owner_id: Uuid) -> Self {
        Self { owner_id }
    }
}
