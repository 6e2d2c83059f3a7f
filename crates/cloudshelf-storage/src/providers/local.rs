//! Local filesystem object store.
//!
//! Each bucket is a directory under the root; object paths map to files
//! beneath it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, warn};

use cloudshelf_core::error::{AppError, ErrorKind};
use cloudshelf_core::result::AppResult;
use cloudshelf_core::traits::storage::ObjectStore;

use super::validate_key;
use crate::signing::UrlSigner;

/// Local filesystem object store.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory holding one sub-directory per bucket.
    root: PathBuf,
    /// Signer for read links.
    signer: UrlSigner,
}

impl LocalObjectStore {
    /// Create a new local store rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>, signer: UrlSigner) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, signer })
    }

    /// Resolve a bucket/path pair to a file under the root.
    fn resolve(&self, bucket: &str, path: &str) -> AppResult<PathBuf> {
        validate_key(bucket, path)?;
        Ok(self.root.join(bucket).join(path.trim_start_matches('/')))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<String> {
        let full_path = self.resolve(bucket, path)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Upstream,
                format!("Failed to write object: {bucket}/{path}"),
                e,
            )
        })?;

        debug!(bucket, path, content_type, bytes = data.len(), "Stored object");
        Ok(format!("{bucket}/{}", path.trim_start_matches('/')))
    }

    async fn get(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(bucket, path)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {bucket}/{path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Upstream,
                    format!("Failed to read object: {bucket}/{path}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> AppResult<()> {
        let mut first_error = None;

        for path in paths {
            let result = match self.resolve(bucket, path) {
                Ok(full_path) => match fs::remove_file(&full_path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(AppError::with_source(
                        ErrorKind::Upstream,
                        format!("Failed to remove object: {bucket}/{path}"),
                        e,
                    )),
                },
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                warn!(bucket, path = %path, error = %e, "Object removal failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn sign(&self, bucket: &str, path: &str, ttl: Duration) -> AppResult<String> {
        validate_key(bucket, path)?;
        self.signer.sign(bucket, path, ttl)
    }
}
