//! Storage folder repository implementation.
//!
//! Capacity is claimed in two steps. An upload first reserves a slot,
//! then either turns the reservation into a counted file or releases it.
//! Every step is a single conditional `UPDATE ... RETURNING`, so
//! `file_count + reserved_count` can never pass `max_file_count`.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use cloudshelf_core::error::{AppError, ErrorKind};
use cloudshelf_core::result::AppResult;
use cloudshelf_entity::storage::{StorageFolder, storage_path};

use crate::errors::{db_error, is_unique_violation};

/// Repository for the per-owner storage folder ledger.
#[derive(Debug, Clone)]
pub struct StorageFolderRepository {
    pool: SqlitePool,
}

impl StorageFolderRepository {
    /// Create a new storage folder repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a storage folder by ID within an owner's ledger.
    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<StorageFolder>> {
        sqlx::query_as::<_, StorageFolder>(
            "SELECT * FROM storage_folders WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find storage folder"))
    }

    /// The highest index allocated so far, if any.
    pub async fn max_index(&self, owner_id: Uuid) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(folder_index) FROM storage_folders WHERE owner_id = ?",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to read max storage folder index"))
    }

    /// Every storage folder of an owner, by index.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<StorageFolder>> {
        sqlx::query_as::<_, StorageFolder>(
            "SELECT * FROM storage_folders WHERE owner_id = ? ORDER BY folder_index ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list storage folders"))
    }

    /// Insert a storage folder at `folder_index` holding one reservation
    /// for the caller.
    ///
    /// The insert only happens while the owner has no active folder.
    /// Losing a race, either for the same index or to a folder that became
    /// active in the meantime, yields `CapacityRace`.
    pub async fn create(
        &self,
        owner_id: Uuid,
        folder_index: i64,
        max_file_count: i64,
    ) -> AppResult<StorageFolder> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, StorageFolder>(
            "INSERT INTO storage_folders \
             (id, owner_id, folder_index, storage_path, file_count, reserved_count, \
              max_file_count, total_size, is_active, created_at, updated_at) \
             SELECT ?1, ?2, ?3, ?4, 0, 1, ?5, 0, (1 < ?5), ?6, ?6 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM storage_folders WHERE owner_id = ?2 AND is_active = 1 \
             ) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(owner_id)
        .bind(folder_index)
        .bind(storage_path(owner_id, folder_index))
        .bind(max_file_count)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::capacity_race(format!(
                    "Storage folder {folder_index} was created concurrently"
                ))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create storage folder", e)
            }
        })?;

        created.ok_or_else(|| {
            AppError::capacity_race("An active storage folder was created concurrently")
        })
    }

    /// Reserve one slot in the newest storage folder with room.
    ///
    /// Returns `None` when every folder of the owner is full or fully
    /// reserved.
    pub async fn reserve(&self, owner_id: Uuid) -> AppResult<Option<StorageFolder>> {
        sqlx::query_as::<_, StorageFolder>(
            "UPDATE storage_folders \
             SET reserved_count = reserved_count + 1, \
                 is_active = (file_count + reserved_count + 1 < max_file_count), \
                 updated_at = ?1 \
             WHERE id = ( \
                 SELECT id FROM storage_folders \
                 WHERE owner_id = ?2 AND file_count + reserved_count < max_file_count \
                 ORDER BY folder_index DESC LIMIT 1 \
             ) \
             AND file_count + reserved_count < max_file_count \
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to reserve storage slot"))
    }

    /// Turn one reservation into a stored file of `size` bytes.
    ///
    /// Fails with `Conflict` when the folder holds no reservation and with
    /// `NotFound` when it does not exist for this owner.
    pub async fn increment(&self, owner_id: Uuid, id: Uuid, size: i64) -> AppResult<StorageFolder> {
        let updated = sqlx::query_as::<_, StorageFolder>(
            "UPDATE storage_folders \
             SET file_count = file_count + 1, \
                 reserved_count = reserved_count - 1, \
                 total_size = total_size + ?1, \
                 updated_at = ?2 \
             WHERE id = ?3 AND owner_id = ?4 AND reserved_count > 0 \
             RETURNING *",
        )
        .bind(size.max(0))
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to increment storage folder"))?;

        match updated {
            Some(folder) => Ok(folder),
            None => match self.find_by_id(owner_id, id).await? {
                Some(folder) => Err(AppError::conflict(format!(
                    "Storage folder {} has no reserved slot ({}/{})",
                    folder.storage_path, folder.file_count, folder.max_file_count
                ))),
                None => Err(AppError::not_found(format!("Storage folder {id} not found"))),
            },
        }
    }

    /// Give back one reservation of an upload that did not complete.
    pub async fn release(&self, owner_id: Uuid, id: Uuid) -> AppResult<StorageFolder> {
        sqlx::query_as::<_, StorageFolder>(
            "UPDATE storage_folders \
             SET reserved_count = MAX(0, reserved_count - 1), \
                 is_active = (file_count + MAX(0, reserved_count - 1) < max_file_count), \
                 updated_at = ?1 \
             WHERE id = ?2 AND owner_id = ?3 \
             RETURNING *",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to release storage slot"))?
        .ok_or_else(|| AppError::not_found(format!("Storage folder {id} not found")))
    }

    /// Release `count` files and `size` bytes, floored at zero.
    pub async fn decrement(
        &self,
        owner_id: Uuid,
        id: Uuid,
        count: i64,
        size: i64,
    ) -> AppResult<StorageFolder> {
        sqlx::query_as::<_, StorageFolder>(
            "UPDATE storage_folders \
             SET file_count = MAX(0, file_count - ?1), \
                 total_size = MAX(0, total_size - ?2), \
                 is_active = (MAX(0, file_count - ?1) + reserved_count < max_file_count), \
                 updated_at = ?3 \
             WHERE id = ?4 AND owner_id = ?5 \
             RETURNING *",
        )
        .bind(count.max(0))
        .bind(size.max(0))
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to decrement storage folder"))?
        .ok_or_else(|| AppError::not_found(format!("Storage folder {id} not found")))
    }
}
