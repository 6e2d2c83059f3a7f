//! Bin-packing of uploads into bounded storage folders.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_database::repositories::StorageFolderRepository;
use cloudshelf_entity::storage::{StorageFolder, StorageUsage};

use crate::context::RequestContext;

/// A lost creation race is resolved by one more full attempt.
const MAX_ALLOCATION_ATTEMPTS: usize = 2;

/// Assigns uploads to the owner's active storage folder.
#[derive(Debug, Clone)]
pub struct StorageAllocator {
    /// Storage folder ledger.
    storage_repo: Arc<StorageFolderRepository>,
    /// Capacity of newly created storage folders.
    max_files_per_folder: i64,
}

impl StorageAllocator {
    /// Creates a new allocator.
    pub fn new(storage_repo: Arc<StorageFolderRepository>, max_files_per_folder: i64) -> Self {
        Self {
            storage_repo,
            max_files_per_folder: max_files_per_folder.max(1),
        }
    }

    /// Reserves one slot in the active storage folder, creating the next
    /// folder when every existing one is full.
    ///
    /// The caller owns the reservation and must hand it back through
    /// [`commit`](Self::commit) or [`release`](Self::release).
    ///
    /// Two callers racing to create the same index collide on the
    /// `(owner_id, folder_index)` constraint; the loser reserves in the
    /// winner's folder instead of computing a new index.
    pub async fn acquire(&self, ctx: &RequestContext) -> AppResult<StorageFolder> {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            if let Some(folder) = self.storage_repo.reserve(ctx.owner_id).await? {
                return Ok(folder);
            }

            let next_index = self
                .storage_repo
                .max_index(ctx.owner_id)
                .await?
                .map_or(0, |max| max + 1);

            match self
                .storage_repo
                .create(ctx.owner_id, next_index, self.max_files_per_folder)
                .await
            {
                Ok(folder) => {
                    info!(
                        owner_id = %ctx.owner_id,
                        storage_folder_id = %folder.id,
                        storage_path = %folder.storage_path,
                        "Storage folder allocated"
                    );
                    return Ok(folder);
                }
                Err(e) if e.is_retryable_race() => {
                    debug!(
                        owner_id = %ctx.owner_id,
                        folder_index = next_index,
                        "Lost storage folder creation race, re-reading"
                    );
                    if let Some(folder) = self.storage_repo.reserve(ctx.owner_id).await? {
                        return Ok(folder);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Could not allocate a storage folder after repeated races",
        ))
    }

    /// Account a stored file of `size` bytes against its reservation.
    pub async fn commit(
        &self,
        ctx: &RequestContext,
        storage_folder_id: Uuid,
        size: i64,
    ) -> AppResult<StorageFolder> {
        self.storage_repo
            .increment(ctx.owner_id, storage_folder_id, size)
            .await
    }

    /// Hand back the reservation of an upload that did not complete.
    pub async fn release(
        &self,
        ctx: &RequestContext,
        storage_folder_id: Uuid,
    ) -> AppResult<StorageFolder> {
        self.storage_repo
            .release(ctx.owner_id, storage_folder_id)
            .await
    }

    /// Release removed files from a storage folder.
    pub async fn decrement(
        &self,
        ctx: &RequestContext,
        storage_folder_id: Uuid,
        count: i64,
        size: i64,
    ) -> AppResult<StorageFolder> {
        self.storage_repo
            .decrement(ctx.owner_id, storage_folder_id, count, size)
            .await
    }

    /// The owner's storage folders and totals.
    pub async fn usage(&self, ctx: &RequestContext) -> AppResult<StorageUsage> {
        let folders = self.storage_repo.list_for_owner(ctx.owner_id).await?;
        let total_files = folders.iter().map(|f| f.file_count).sum();
        let total_bytes = folders.iter().map(|f| f.total_size).sum();

        Ok(StorageUsage {
            owner_id: ctx.owner_id,
            folders,
            total_files,
            total_bytes,
        })
    }
}
