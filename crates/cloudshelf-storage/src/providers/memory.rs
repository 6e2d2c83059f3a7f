//! In-memory object store for tests and ephemeral deployments.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_core::traits::storage::ObjectStore;

use super::validate_key;
use crate::signing::UrlSigner;

/// A stored object and its declared content type.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Object store keeping every object in a map.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    signer: UrlSigner,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new(signer: UrlSigner) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            signer,
        }
    }

    fn key(bucket: &str, path: &str) -> (String, String) {
        (bucket.to_string(), path.trim_start_matches('/').to_string())
    }

    /// Number of objects in a bucket.
    pub async fn len(&self, bucket: &str) -> usize {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .count()
    }

    /// Whether a bucket holds no objects.
    pub async fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket).await == 0
    }

    /// Declared content type of an object.
    pub async fn content_type(&self, bucket: &str, path: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(&Self::key(bucket, path))
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<String> {
        validate_key(bucket, path)?;
        let key = Self::key(bucket, path);
        let location = format!("{}/{}", key.0, key.1);
        self.objects.write().await.insert(
            key,
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(location)
    }

    async fn get(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        validate_key(bucket, path)?;
        self.objects
            .read()
            .await
            .get(&Self::key(bucket, path))
            .map(|o| o.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {bucket}/{path}")))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> AppResult<()> {
        let mut objects = self.objects.write().await;
        for path in paths {
            objects.remove(&Self::key(bucket, path));
        }
        Ok(())
    }

    async fn sign(&self, bucket: &str, path: &str, ttl: Duration) -> AppResult<String> {
        validate_key(bucket, path)?;
        self.signer.sign(bucket, path, ttl)
    }
}
