//! File reads, edits, moves, and deletes.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_database::repositories::FileRepository;
use cloudshelf_entity::file::{FileQuery, UpdateFile, UploadedFile};

use super::view::{FileView, LinkSigner};
use crate::context::RequestContext;
use crate::folder::{FolderTarget, PathResolver};
use crate::storage::StorageAllocator;

/// Most file IDs one move or delete may name; bounds the bound-parameter
/// list of the underlying `IN (...)` statements.
pub const MAX_FILE_IDS_PER_REQUEST: usize = 1000;

/// Summary of a bulk delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSummary {
    /// Records removed.
    pub deleted: u64,
    /// Bytes released.
    pub released_bytes: i64,
}

/// Summary of a bulk move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveSummary {
    /// Records moved.
    pub moved: u64,
    /// The folder they now live in.
    pub target_folder_id: Uuid,
}

/// Handles file reads, metadata edits, moves, and deletes.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File repository.
    file_repo: Arc<FileRepository>,
    /// Path resolver for move targets.
    resolver: Arc<PathResolver>,
    /// Storage folder allocator, for releasing capacity.
    allocator: Arc<StorageAllocator>,
    /// Object store holding the bytes.
    store: Arc<dyn ObjectStore>,
    /// Signed link builder.
    links: LinkSigner,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        resolver: Arc<PathResolver>,
        allocator: Arc<StorageAllocator>,
        store: Arc<dyn ObjectStore>,
        links: LinkSigner,
    ) -> Self {
        Self {
            file_repo,
            resolver,
            allocator,
            store,
            links,
        }
    }

    /// Gets a file with signed links.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<FileView> {
        let file = self.owned_file(ctx, file_id).await?;
        Ok(self.links.view(self.store.as_ref(), file, true).await)
    }

    /// Lists the completed files of a logical folder.
    pub async fn list_in_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        query: &FileQuery,
    ) -> AppResult<Vec<FileView>> {
        let files = self
            .file_repo
            .list_in_folder(ctx.owner_id, folder_id, query)
            .await?;

        let mut views = Vec::with_capacity(files.len());
        for file in files {
            views.push(self.links.view(self.store.as_ref(), file, false).await);
        }
        Ok(views)
    }

    /// Edits the user-editable fields of a file.
    pub async fn update_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        mut changes: UpdateFile,
    ) -> AppResult<FileView> {
        self.owned_file(ctx, file_id).await?;

        if let Some(name) = &changes.display_filename {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(AppError::validation("Display name cannot be empty"));
            }
            if trimmed.contains(['/', '\\']) {
                return Err(AppError::validation(
                    "Display name cannot contain path separators",
                ));
            }
            changes.display_filename = Some(trimmed.to_string());
        }
        if let Some(tags) = changes.tags.take() {
            let mut seen = HashSet::new();
            let cleaned = tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty() && seen.insert(t.clone()))
                .collect();
            changes.tags = Some(cleaned);
        }

        let file = self.file_repo.update(ctx.owner_id, file_id, &changes).await?;
        info!(owner_id = %ctx.owner_id, file_id = %file.id, "File updated");
        Ok(self.links.view(self.store.as_ref(), file, true).await)
    }

    /// Moves files to another logical folder, all or nothing.
    ///
    /// Only `folder_id` changes; bytes, storage folder, and counters stay
    /// where they are.
    pub async fn move_files(
        &self,
        ctx: &RequestContext,
        file_ids: &[Uuid],
        target: &FolderTarget,
    ) -> AppResult<MoveSummary> {
        let ids = dedupe(file_ids)?;
        let folder = self.resolver.target(ctx, target).await?;
        self.owned_files(ctx, &ids).await?;

        let moved = self
            .file_repo
            .move_to_folder(ctx.owner_id, &ids, folder.id)
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            target_folder_id = %folder.id,
            moved,
            "Files moved"
        );

        Ok(MoveSummary {
            moved,
            target_folder_id: folder.id,
        })
    }

    /// Deletes files.
    ///
    /// Metadata goes first and is the only step that can fail the request.
    /// Counter releases and byte removal follow as individually logged
    /// best-effort steps.
    pub async fn delete_files(
        &self,
        ctx: &RequestContext,
        file_ids: &[Uuid],
    ) -> AppResult<DeleteSummary> {
        let ids = dedupe(file_ids)?;
        self.owned_files(ctx, &ids).await?;

        let deleted = self.file_repo.delete_many(ctx.owner_id, &ids).await?;

        let mut releases: BTreeMap<Uuid, (i64, i64)> = BTreeMap::new();
        for file in &deleted {
            let entry = releases.entry(file.storage_folder_id).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += file.file_size;
        }

        for (storage_folder_id, (count, size)) in &releases {
            if let Err(e) = self
                .allocator
                .decrement(ctx, *storage_folder_id, *count, *size)
                .await
            {
                warn!(
                    owner_id = %ctx.owner_id,
                    storage_folder_id = %storage_folder_id,
                    count,
                    size,
                    error = %e,
                    "Failed to release storage folder capacity"
                );
            }
        }

        self.remove_bytes(ctx, &deleted).await;

        let released_bytes: i64 = deleted.iter().map(|f| f.file_size).sum();
        info!(
            owner_id = %ctx.owner_id,
            deleted = deleted.len(),
            released_bytes,
            "Files deleted"
        );

        Ok(DeleteSummary {
            deleted: deleted.len() as u64,
            released_bytes,
        })
    }

    /// Best-effort removal of originals and thumbnails, grouped by bucket.
    async fn remove_bytes(&self, ctx: &RequestContext, files: &[UploadedFile]) {
        let mut by_bucket: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for file in files {
            by_bucket
                .entry(file.storage_bucket.as_str())
                .or_default()
                .push(file.file_path.clone());
            if let Some(thumb) = &file.thumbnail_path {
                by_bucket
                    .entry(self.links.thumbnails_bucket.as_str())
                    .or_default()
                    .push(thumb.clone());
            }
        }

        for (bucket, paths) in by_bucket {
            if let Err(e) = self.store.remove(bucket, &paths).await {
                warn!(
                    owner_id = %ctx.owner_id,
                    bucket,
                    objects = paths.len(),
                    error = %e,
                    "Failed to remove deleted file bytes"
                );
            }
        }
    }

    /// Load a file the requester owns.
    async fn owned_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<UploadedFile> {
        if let Some(file) = self.file_repo.find_by_id(ctx.owner_id, file_id).await? {
            return Ok(file);
        }
        if self.file_repo.count_existing_any_owner(&[file_id]).await? > 0 {
            Err(AppError::permission_denied("File belongs to another owner"))
        } else {
            Err(AppError::not_found(format!("File {file_id} not found")))
        }
    }

    /// Require every ID to be a file the requester owns.
    async fn owned_files(&self, ctx: &RequestContext, ids: &[Uuid]) -> AppResult<Vec<UploadedFile>> {
        let files = self.file_repo.find_many(ctx.owner_id, ids).await?;
        if files.len() == ids.len() {
            return Ok(files);
        }

        let existing = self.file_repo.count_existing_any_owner(ids).await?;
        if existing > files.len() as u64 {
            Err(AppError::permission_denied(
                "One or more files do not belong to you",
            ))
        } else {
            Err(AppError::not_found("One or more files were not found"))
        }
    }
}

/// Drop duplicate IDs, keeping first-seen order.
fn dedupe(ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    if ids.is_empty() {
        return Err(AppError::validation("No files specified"));
    }
    if ids.len() > MAX_FILE_IDS_PER_REQUEST {
        return Err(AppError::validation(format!(
            "At most {MAX_FILE_IDS_PER_REQUEST} files per request, got {}",
            ids.len()
        )));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
}
