//! Uploaded file repository implementation.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use cloudshelf_core::error::{AppError, ErrorKind};
use cloudshelf_core::result::AppResult;
use cloudshelf_entity::file::{
    CreateUploadedFile, FileQuery, FileType, UpdateFile, UploadStatus, UploadedFile,
};

use crate::errors::db_error;

/// Repository for uploaded file records.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

/// Append `(?, ?, ...)` with one bind per id.
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[Uuid]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a file by ID within an owner's records.
    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<UploadedFile>> {
        sqlx::query_as::<_, UploadedFile>(
            "SELECT * FROM uploaded_files WHERE id = ? AND owner_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find file"))
    }

    /// Fetch every listed file owned by `owner_id`. Foreign or missing IDs
    /// are simply absent from the result.
    pub async fn find_many(&self, owner_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<UploadedFile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM uploaded_files WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND id IN ");
        push_id_list(&mut qb, ids);

        qb.build_query_as::<UploadedFile>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch files"))
    }

    /// How many of `ids` exist under any owner.
    pub async fn count_existing_any_owner(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM uploaded_files WHERE id IN ");
        push_id_list(&mut qb, ids);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count files"))?;
        Ok(count as u64)
    }

    /// Insert a completed file record.
    pub async fn create(&self, data: &CreateUploadedFile) -> AppResult<UploadedFile> {
        let now = Utc::now();
        sqlx::query_as::<_, UploadedFile>(
            "INSERT INTO uploaded_files \
             (id, owner_id, folder_id, storage_folder_id, original_filename, stored_filename, \
              display_filename, file_path, storage_bucket, file_size, mime_type, file_type, \
              has_thumbnail, thumbnail_path, thumbnail_size, upload_status, is_starred, tags, \
              created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(data.storage_folder_id)
        .bind(&data.original_filename)
        .bind(&data.stored_filename)
        .bind(&data.original_filename)
        .bind(&data.file_path)
        .bind(&data.storage_bucket)
        .bind(data.file_size)
        .bind(&data.mime_type)
        .bind(FileType::from_mime(&data.mime_type))
        .bind(data.thumbnail_path.is_some())
        .bind(&data.thumbnail_path)
        .bind(data.thumbnail_size)
        .bind(UploadStatus::Completed)
        .bind(Json(Vec::<String>::new()))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create file record"))
    }

    /// List completed files of a logical folder.
    pub async fn list_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Uuid,
        query: &FileQuery,
    ) -> AppResult<Vec<UploadedFile>> {
        let window = query.window();

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM uploaded_files WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND folder_id = ");
        qb.push_bind(folder_id);
        qb.push(" AND upload_status = ");
        qb.push_bind(UploadStatus::Completed);
        if let Some(file_type) = query.file_type {
            qb.push(" AND file_type = ");
            qb.push_bind(file_type);
        }
        // Column and direction come from closed enums, never from input.
        let direction = query.sort_order.as_sql();
        qb.push(format!(
            " ORDER BY {} {direction}, id {direction} LIMIT ",
            query.sort_by.column()
        ));
        qb.push_bind(window.limit());
        qb.push(" OFFSET ");
        qb.push_bind(window.offset());

        qb.build_query_as::<UploadedFile>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list files"))
    }

    /// Point every listed file at `folder_id`, all or nothing.
    ///
    /// Rolls back and fails with `PermissionDenied` unless exactly
    /// `ids.len()` rows owned by `owner_id` were updated.
    pub async fn move_to_folder(
        &self,
        owner_id: Uuid,
        ids: &[Uuid],
        folder_id: Uuid,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin file move"))?;

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE uploaded_files SET folder_id = ");
        qb.push_bind(folder_id);
        qb.push(", updated_at = ");
        qb.push_bind(Utc::now());
        qb.push(" WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND id IN ");
        push_id_list(&mut qb, ids);

        let result = qb
            .build()
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to move files"))?;

        if result.rows_affected() != ids.len() as u64 {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back file move"))?;
            return Err(AppError::permission_denied(
                "One or more files do not belong to you",
            ));
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit file move"))?;
        Ok(result.rows_affected())
    }

    /// Delete the owner's listed files and return the rows that were
    /// actually removed by this call.
    pub async fn delete_many(&self, owner_id: Uuid, ids: &[Uuid]) -> AppResult<Vec<UploadedFile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin file delete"))?;

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM uploaded_files WHERE owner_id = ");
        qb.push_bind(owner_id);
        qb.push(" AND id IN ");
        push_id_list(&mut qb, ids);
        qb.push(" RETURNING *");

        let deleted = qb
            .build_query_as::<UploadedFile>()
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to delete files"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit file delete"))?;
        Ok(deleted)
    }

    /// Update user-editable fields of a file.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        changes: &UpdateFile,
    ) -> AppResult<UploadedFile> {
        sqlx::query_as::<_, UploadedFile>(
            "UPDATE uploaded_files \
             SET display_filename = COALESCE(?, display_filename), \
                 is_starred = COALESCE(?, is_starred), \
                 tags = COALESCE(?, tags), \
                 updated_at = ? \
             WHERE id = ? AND owner_id = ? RETURNING *",
        )
        .bind(&changes.display_filename)
        .bind(changes.is_starred)
        .bind(changes.tags.clone().map(Json))
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }
}
