//! File upload pipeline: allocation, thumbnail, bytes, metadata, counters.
//!
//! Each file reserves a storage slot before anything is written. Every
//! step that stores something is undone if a later step fails, and the
//! reservation is released with it. Once the record is durable the
//! reservation becomes a counted file; a failure there is only logged.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cloudshelf_core::config::{StorageConfig, UploadConfig};
use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_core::traits::thumbnail::ThumbnailPipeline;
use cloudshelf_database::repositories::FileRepository;
use cloudshelf_entity::file::{
    CreateUploadedFile, UploadedFile, file_path, sanitize_filename, stored_filename,
    thumbnail_path,
};
use cloudshelf_entity::folder::LogicalFolder;
use cloudshelf_entity::storage::StorageFolder;

use crate::context::RequestContext;
use crate::folder::{FolderTarget, PathResolver};
use crate::storage::StorageAllocator;

/// One file of an upload request.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Name supplied by the client.
    pub filename: String,
    /// Declared content type.
    pub content_type: Option<String>,
    /// File bytes.
    pub data: Bytes,
}

/// Error details of a failed upload item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Result of one upload item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Name supplied by the client.
    pub filename: String,
    /// Whether the file was stored.
    pub success: bool,
    /// The created record.
    pub file: Option<UploadedFile>,
    /// Why the file was rejected.
    pub error: Option<UploadFailure>,
}

impl UploadOutcome {
    fn from_result(filename: String, result: AppResult<UploadedFile>) -> Self {
        match result {
            Ok(file) => Self {
                filename,
                success: true,
                file: Some(file),
                error: None,
            },
            Err(e) => Self {
                filename,
                success: false,
                file: None,
                error: Some(UploadFailure {
                    code: e.kind.code().to_string(),
                    message: e.message,
                }),
            },
        }
    }
}

/// Handles batched file uploads.
#[derive(Clone)]
pub struct UploadService {
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Path resolver for the target folder.
    resolver: Arc<PathResolver>,
    /// Storage folder allocator.
    allocator: Arc<StorageAllocator>,
    /// Object store for originals and thumbnails.
    store: Arc<dyn ObjectStore>,
    /// Thumbnail pipeline.
    thumbnails: Arc<dyn ThumbnailPipeline>,
    /// Bucket names.
    storage_config: StorageConfig,
    /// Batch settings.
    upload_config: UploadConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("store", &self.store.provider_type())
            .field("batch_size", &self.upload_config.batch_size)
            .finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        resolver: Arc<PathResolver>,
        allocator: Arc<StorageAllocator>,
        store: Arc<dyn ObjectStore>,
        thumbnails: Arc<dyn ThumbnailPipeline>,
        storage_config: StorageConfig,
        upload_config: UploadConfig,
    ) -> Self {
        Self {
            file_repo,
            resolver,
            allocator,
            store,
            thumbnails,
            storage_config,
            upload_config,
        }
    }

    /// Upload a batch of files into one logical folder.
    ///
    /// The target folder must resolve or the whole request fails. After
    /// that, each file succeeds or fails on its own; outcomes are returned
    /// in input order.
    pub async fn upload_batch(
        &self,
        ctx: &RequestContext,
        target: &FolderTarget,
        items: Vec<UploadItem>,
    ) -> AppResult<Vec<UploadOutcome>> {
        if items.is_empty() {
            return Err(AppError::validation("No files to upload"));
        }

        let folder = self.resolver.target(ctx, target).await?;
        let batch_size = self.upload_config.batch_size.max(1);
        let pause = Duration::from_millis(self.upload_config.batch_pause_ms);

        let mut outcomes = Vec::with_capacity(items.len());
        let mut chunks = items.chunks(batch_size).peekable();

        while let Some(chunk) = chunks.next() {
            let results = join_all(chunk.iter().map(|item| self.upload_one(ctx, &folder, item))).await;

            outcomes.extend(
                chunk
                    .iter()
                    .zip(results)
                    .map(|(item, result)| UploadOutcome::from_result(item.filename.clone(), result)),
            );

            if chunks.peek().is_some() && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        let stored = outcomes.iter().filter(|o| o.success).count();
        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            stored,
            failed = outcomes.len() - stored,
            "Upload batch finished"
        );

        Ok(outcomes)
    }

    /// Upload a single file into the given folder.
    pub async fn upload_one(
        &self,
        ctx: &RequestContext,
        folder: &LogicalFolder,
        item: &UploadItem,
    ) -> AppResult<UploadedFile> {
        let storage = self.allocator.acquire(ctx).await?;

        let file = match self.store_in(ctx, folder, &storage, item).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(release_err) = self.allocator.release(ctx, storage.id).await {
                    warn!(
                        owner_id = %ctx.owner_id,
                        storage_folder_id = %storage.id,
                        error = %release_err,
                        "Failed to release storage slot"
                    );
                }
                return Err(e);
            }
        };

        if let Err(e) = self.allocator.commit(ctx, storage.id, file.file_size).await {
            warn!(
                owner_id = %ctx.owner_id,
                file_id = %file.id,
                storage_folder_id = %storage.id,
                error = %e,
                "Storage slot not committed; accounting is stale"
            );
        }

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file.id,
            folder_id = %folder.id,
            storage_path = %storage.storage_path,
            size = file.file_size,
            "File uploaded"
        );

        Ok(file)
    }

    /// Write thumbnail, original and record into a reserved storage folder.
    async fn store_in(
        &self,
        ctx: &RequestContext,
        folder: &LogicalFolder,
        storage: &StorageFolder,
        item: &UploadItem,
    ) -> AppResult<UploadedFile> {
        let original_filename = sanitize_filename(&item.filename);
        let mime_type = resolve_mime_type(&original_filename, item.content_type.as_deref());
        let stored = stored_filename(&original_filename, Utc::now());
        let object_path = file_path(&storage.storage_path, &stored);

        let kind = self.thumbnails.classify(&original_filename);
        let thumbnail = if kind.requires_thumbnail() {
            Some(self.thumbnails.generate(kind, item.data.clone()).await?)
        } else {
            None
        };

        let thumb_path = match &thumbnail {
            Some(bytes) => {
                let path = thumbnail_path(ctx.owner_id, storage.folder_index, &stored);
                self.store
                    .put(
                        &self.storage_config.thumbnails_bucket,
                        &path,
                        bytes.clone(),
                        self.thumbnails.output_content_type(),
                    )
                    .await?;
                Some(path)
            }
            None => None,
        };

        if let Err(e) = self
            .store
            .put(
                &self.storage_config.originals_bucket,
                &object_path,
                item.data.clone(),
                &mime_type,
            )
            .await
        {
            self.remove_objects(ctx, None, thumb_path.as_deref()).await;
            return Err(e);
        }

        let record = CreateUploadedFile {
            owner_id: ctx.owner_id,
            folder_id: folder.id,
            storage_folder_id: storage.id,
            original_filename,
            stored_filename: stored,
            file_path: object_path.clone(),
            storage_bucket: self.storage_config.originals_bucket.clone(),
            file_size: item.data.len() as i64,
            mime_type,
            thumbnail_size: thumbnail.as_ref().map(|b| b.len() as i64),
            thumbnail_path: thumb_path.clone(),
        };

        match self.file_repo.create(&record).await {
            Ok(file) => Ok(file),
            Err(e) => {
                self.remove_objects(ctx, Some(&object_path), thumb_path.as_deref())
                    .await;
                Err(e)
            }
        }
    }

    /// Best-effort removal of bytes stored by a failed upload.
    async fn remove_objects(
        &self,
        ctx: &RequestContext,
        original: Option<&str>,
        thumbnail: Option<&str>,
    ) {
        if let Some(path) = original {
            if let Err(e) = self
                .store
                .remove(&self.storage_config.originals_bucket, &[path.to_string()])
                .await
            {
                warn!(owner_id = %ctx.owner_id, path, error = %e, "Failed to roll back original");
            }
        }
        if let Some(path) = thumbnail {
            if let Err(e) = self
                .store
                .remove(&self.storage_config.thumbnails_bucket, &[path.to_string()])
                .await
            {
                warn!(owner_id = %ctx.owner_id, path, error = %e, "Failed to roll back thumbnail");
            }
        }
    }
}

/// Declared content type, or one guessed from the extension.
fn resolve_mime_type(filename: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
            mime.to_ascii_lowercase()
        }
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}
