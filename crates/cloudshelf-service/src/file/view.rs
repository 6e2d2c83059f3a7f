//! Client-facing file representations with signed links.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_entity::file::UploadedFile;

/// A file record plus short-lived read links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileView {
    /// The stored record.
    #[serde(flatten)]
    pub file: UploadedFile,
    /// Signed link to the original bytes.
    pub url: Option<String>,
    /// Signed link to the thumbnail, when one exists.
    pub thumbnail_url: Option<String>,
}

/// Buckets and link lifetime used when signing file links.
#[derive(Debug, Clone)]
pub struct LinkSigner {
    /// Bucket holding thumbnails.
    pub thumbnails_bucket: String,
    /// Lifetime of each link.
    pub ttl: Duration,
}

impl LinkSigner {
    /// Build a view. Signing failures leave the link empty.
    pub async fn view(
        &self,
        store: &dyn ObjectStore,
        file: UploadedFile,
        with_original: bool,
    ) -> FileView {
        let url = if with_original {
            self.sign(store, &file.storage_bucket, &file.file_path).await
        } else {
            None
        };

        let thumbnail_url = match (&file.thumbnail_path, file.has_thumbnail) {
            (Some(path), true) => self.sign(store, &self.thumbnails_bucket, path).await,
            _ => None,
        };

        FileView {
            file,
            url,
            thumbnail_url,
        }
    }

    async fn sign(&self, store: &dyn ObjectStore, bucket: &str, path: &str) -> Option<String> {
        match store.sign(bucket, path, self.ttl).await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(bucket, path, error = %e, "Failed to sign object URL");
                None
            }
        }
    }
}
