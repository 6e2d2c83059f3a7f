//! Object store trait for bucketed byte storage.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// A bucketed key-value byte store addressed by slash-delimited paths.
///
/// Two buckets are used by the upload pipeline: one for originals and one
/// for thumbnails. Paths are opaque keys; implementations must not
/// interpret `..` segments.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store `data` at `path` in `bucket`, returning the object location.
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<String>;

    /// Read the object at `path`. Missing objects yield `NotFound`.
    async fn get(&self, bucket: &str, path: &str) -> AppResult<Bytes>;

    /// Remove every path in `paths`.
    ///
    /// Missing objects are not an error. All paths are attempted even when
    /// one fails; the first failure is returned afterwards.
    async fn remove(&self, bucket: &str, paths: &[String]) -> AppResult<()>;

    /// Produce a time-limited URL for reading the object.
    async fn sign(&self, bucket: &str, path: &str, ttl: Duration) -> AppResult<String>;
}
