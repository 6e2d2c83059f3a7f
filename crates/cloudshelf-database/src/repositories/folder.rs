//! Logical folder repository implementation.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_entity::folder::{CreateFolder, LogicalFolder};

use crate::errors::{db_error, is_unique_violation};

/// Repository for logical folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: SqlitePool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a folder by ID within an owner's tree.
    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<LogicalFolder>> {
        sqlx::query_as::<_, LogicalFolder>(
            "SELECT * FROM logical_folders WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find folder"))
    }

    /// Whether a folder with this ID exists under any owner.
    pub async fn exists_any_owner(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM logical_folders WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check folder existence"))
    }

    /// Find the owner's system root folder.
    pub async fn find_root(&self, owner_id: Uuid) -> AppResult<Option<LogicalFolder>> {
        sqlx::query_as::<_, LogicalFolder>(
            "SELECT * FROM logical_folders \
             WHERE owner_id = ? AND parent_id IS NULL AND is_system = 1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find root folder"))
    }

    /// Find a non-system child folder by exact name.
    pub async fn find_child_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        name: &str,
    ) -> AppResult<Option<LogicalFolder>> {
        sqlx::query_as::<_, LogicalFolder>(
            "SELECT * FROM logical_folders \
             WHERE owner_id = ? AND parent_id = ? AND name = ? AND is_system = 0",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find child folder"))
    }

    /// List the direct non-system children of a folder, by name.
    pub async fn find_children(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
    ) -> AppResult<Vec<LogicalFolder>> {
        sqlx::query_as::<_, LogicalFolder>(
            "SELECT * FROM logical_folders \
             WHERE owner_id = ? AND parent_id = ? AND is_system = 0 \
             ORDER BY name COLLATE NOCASE ASC, name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list child folders"))
    }

    /// Recursive query for every non-system descendant of a folder.
    ///
    /// Ordered by depth, then name, so parents precede their children.
    pub async fn find_descendants(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
    ) -> AppResult<Vec<LogicalFolder>> {
        sqlx::query_as::<_, LogicalFolder>(
            "WITH RECURSIVE tree AS ( \
                SELECT * FROM logical_folders WHERE id = ?1 AND owner_id = ?2 \
                UNION ALL \
                SELECT f.* FROM logical_folders f \
                INNER JOIN tree t ON f.parent_id = t.id \
                WHERE f.owner_id = ?2 \
             ) SELECT * FROM tree WHERE id != ?1 AND is_system = 0 \
             ORDER BY depth ASC, name COLLATE NOCASE ASC, name ASC",
        )
        .bind(parent_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list descendants"))
    }

    /// The ancestor chain from the root down to (and including) a folder.
    pub async fn find_ancestors(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Vec<LogicalFolder>> {
        sqlx::query_as::<_, LogicalFolder>(
            "WITH RECURSIVE ancestors AS ( \
                SELECT * FROM logical_folders WHERE id = ?1 AND owner_id = ?2 \
                UNION ALL \
                SELECT f.* FROM logical_folders f \
                INNER JOIN ancestors a ON f.id = a.parent_id \
                WHERE f.owner_id = ?2 \
             ) SELECT * FROM ancestors ORDER BY depth ASC",
        )
        .bind(folder_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find ancestors"))
    }

    /// Insert a folder.
    ///
    /// A UNIQUE violation (sibling name, or a second root) is reported as
    /// `DuplicateName`.
    pub async fn create(&self, data: &CreateFolder) -> AppResult<LogicalFolder> {
        let now = Utc::now();
        sqlx::query_as::<_, LogicalFolder>(
            "INSERT INTO logical_folders \
             (id, owner_id, name, parent_id, full_path, depth, is_system, color, description, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(&data.full_path)
        .bind(data.depth)
        .bind(data.is_system)
        .bind(&data.color)
        .bind(&data.description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::duplicate_name(format!(
                    "A folder named '{}' already exists here",
                    data.name
                ))
            } else {
                AppError::with_source(
                    cloudshelf_core::ErrorKind::Database,
                    "Failed to create folder",
                    e,
                )
            }
        })
    }

    /// Update a folder's fields and, when its path changes, the path of
    /// every descendant, in one transaction.
    pub async fn update(
        &self,
        owner_id: Uuid,
        folder: &LogicalFolder,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
        new_path: &str,
    ) -> AppResult<LogicalFolder> {
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin folder update"))?;

        let updated = sqlx::query_as::<_, LogicalFolder>(
            "UPDATE logical_folders \
             SET name = ?, full_path = ?, color = ?, description = ?, updated_at = ? \
             WHERE id = ? AND owner_id = ? AND is_system = 0 RETURNING *",
        )
        .bind(name)
        .bind(new_path)
        .bind(color)
        .bind(description)
        .bind(now)
        .bind(folder.id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::duplicate_name(format!("A folder named '{name}' already exists here"))
            } else {
                AppError::with_source(
                    cloudshelf_core::ErrorKind::Database,
                    "Failed to update folder",
                    e,
                )
            }
        })?
        .ok_or_else(|| AppError::not_found(format!("Folder {} not found", folder.id)))?;

        if folder.full_path != new_path {
            let old_prefix = format!("{}/", folder.full_path);
            sqlx::query(
                "UPDATE logical_folders \
                 SET full_path = ?1 || substr(full_path, ?2), updated_at = ?3 \
                 WHERE owner_id = ?4 AND substr(full_path, 1, ?5) = ?6",
            )
            .bind(new_path)
            .bind(folder.full_path.chars().count() as i64 + 1)
            .bind(now)
            .bind(owner_id)
            .bind(old_prefix.chars().count() as i64)
            .bind(&old_prefix)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to rewrite descendant paths"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder update"))?;

        Ok(updated)
    }

    /// Delete folders in the given order inside one transaction.
    ///
    /// Callers pass children before parents. Any failure (including the
    /// RESTRICT foreign key from a file that appeared concurrently) rolls
    /// back every deletion.
    pub async fn delete_many(&self, owner_id: Uuid, ordered_ids: &[Uuid]) -> AppResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin folder delete"))?;

        let mut deleted = 0;
        for id in ordered_ids {
            let result = sqlx::query(
                "DELETE FROM logical_folders WHERE id = ? AND owner_id = ? AND is_system = 0",
            )
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::not_empty("Folder received new content while being deleted")
                }
                _ => AppError::with_source(
                    cloudshelf_core::ErrorKind::Database,
                    "Failed to delete folder",
                    e,
                ),
            })?;
            deleted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder delete"))?;

        Ok(deleted)
    }

    /// Count direct child folders.
    pub async fn count_children(&self, owner_id: Uuid, folder_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM logical_folders WHERE owner_id = ? AND parent_id = ?",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count child folders"))?;
        Ok(count as u64)
    }

    /// Count file records of any status referencing any of the folders.
    pub async fn count_files_in(&self, owner_id: Uuid, folder_ids: &[Uuid]) -> AppResult<u64> {
        if folder_ids.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM uploaded_files WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND folder_id IN (");
        let mut separated = qb.separated(", ");
        for id in folder_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count files"))?;
        Ok(count as u64)
    }

    /// Completed-file counts for a batch of folders.
    pub async fn count_completed_files_batch(
        &self,
        owner_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, u64>> {
        if folder_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT folder_id, COUNT(*) FROM uploaded_files \
             WHERE upload_status = 'completed' AND owner_id = ",
        );
        qb.push_bind(owner_id);
        qb.push(" AND folder_id IN (");
        let mut separated = qb.separated(", ");
        for id in folder_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") GROUP BY folder_id");

        let rows: Vec<(Uuid, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to count files per folder"))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count as u64))
            .collect())
    }
}
