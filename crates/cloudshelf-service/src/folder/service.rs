//! Logical folder CRUD with owner scoping.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_database::repositories::FolderRepository;
use cloudshelf_entity::folder::{
    CreateFolder, LogicalFolder, MAX_DEPTH, UpdateFolder, child_path, validate_folder_name,
};

use super::resolver::{FolderTarget, PathResolver};
use crate::context::RequestContext;

/// Manages logical folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Path resolver.
    resolver: Arc<PathResolver>,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID. Falls back to `parent_path`, then the root.
    pub parent_id: Option<Uuid>,
    /// Parent folder path.
    pub parent_path: Option<String>,
    /// Display color.
    pub color: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folder_repo: Arc<FolderRepository>, resolver: Arc<PathResolver>) -> Self {
        Self {
            folder_repo,
            resolver,
        }
    }

    /// Returns the owner's root folder, creating it if needed.
    pub async fn get_or_create_root(&self, ctx: &RequestContext) -> AppResult<LogicalFolder> {
        self.resolver.root(ctx).await
    }

    /// Gets a folder by ID.
    pub async fn get_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<LogicalFolder> {
        self.resolver.owned_folder(ctx, folder_id).await
    }

    /// Lists the direct children of a folder (the root when `None`).
    pub async fn list_children(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<LogicalFolder>> {
        let parent = match parent_id {
            Some(id) => self.resolver.owned_folder(ctx, id).await?,
            None => self.resolver.root(ctx).await?,
        };
        self.folder_repo.find_children(ctx.owner_id, parent.id).await
    }

    /// The ancestor chain from the root down to the folder.
    pub async fn breadcrumbs(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<LogicalFolder>> {
        let chain = self
            .folder_repo
            .find_ancestors(ctx.owner_id, folder_id)
            .await?;
        if chain.is_empty() {
            self.resolver.owned_folder(ctx, folder_id).await?;
        }
        Ok(chain)
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<LogicalFolder> {
        let name = validate_folder_name(&req.name)?;

        let target = FolderTarget {
            folder_id: req.parent_id,
            path: req.parent_path,
        };
        let parent = self.resolver.target(ctx, &target).await?;

        if parent.depth >= MAX_DEPTH {
            return Err(AppError::depth_exceeded(format!(
                "Folders cannot be nested deeper than {MAX_DEPTH} levels"
            )));
        }

        if self
            .folder_repo
            .find_child_by_name(ctx.owner_id, parent.id, &name)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate_name(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        let data = CreateFolder {
            owner_id: ctx.owner_id,
            parent_id: Some(parent.id),
            full_path: child_path(&parent.full_path, &name),
            depth: parent.depth + 1,
            name,
            is_system: false,
            color: req.color,
            description: req.description,
        };

        let folder = self.folder_repo.create(&data).await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            path = %folder.full_path,
            "Folder created"
        );

        Ok(folder)
    }

    /// Renames and/or re-describes a folder.
    pub async fn update_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        changes: UpdateFolder,
    ) -> AppResult<LogicalFolder> {
        let folder = self.resolver.owned_folder(ctx, folder_id).await?;
        if folder.is_system {
            return Err(AppError::permission_denied(
                "System folders cannot be modified",
            ));
        }
        if changes.is_empty() {
            return Ok(folder);
        }

        let name = match &changes.name {
            Some(name) => validate_folder_name(name)?,
            None => folder.name.clone(),
        };

        let Some(parent_id) = folder.parent_id else {
            return Err(AppError::internal("Non-system folder has no parent"));
        };
        let parent = self.resolver.owned_folder(ctx, parent_id).await?;

        if name != folder.name {
            let existing = self
                .folder_repo
                .find_child_by_name(ctx.owner_id, parent.id, &name)
                .await?;
            if existing.is_some_and(|f| f.id != folder.id) {
                return Err(AppError::duplicate_name(format!(
                    "A folder named '{name}' already exists here"
                )));
            }
        }

        let color = changes.color.as_deref().or(folder.color.as_deref());
        let description = changes
            .description
            .as_deref()
            .or(folder.description.as_deref());
        let new_path = child_path(&parent.full_path, &name);

        let updated = self
            .folder_repo
            .update(ctx.owner_id, &folder, &name, color, description, &new_path)
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %updated.id,
            path = %updated.full_path,
            "Folder updated"
        );

        Ok(updated)
    }

    /// Deletes a folder.
    ///
    /// Non-recursive deletes require the folder to hold no files and no
    /// subfolders. Recursive deletes require the whole subtree to hold no
    /// files and remove it in one transaction, deepest folders first.
    pub async fn delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        recursive: bool,
    ) -> AppResult<u64> {
        let folder = self.resolver.owned_folder(ctx, folder_id).await?;
        if folder.is_system {
            return Err(AppError::permission_denied(
                "System folders cannot be deleted",
            ));
        }

        if self
            .folder_repo
            .count_files_in(ctx.owner_id, &[folder.id])
            .await?
            > 0
        {
            return Err(AppError::not_empty("Folder contains files"));
        }

        let child_count = self.folder_repo.count_children(ctx.owner_id, folder.id).await?;
        let mut ordered = Vec::new();

        if child_count > 0 {
            if !recursive {
                return Err(AppError::has_children(
                    "Folder contains subfolders; delete recursively to remove them",
                ));
            }

            let mut descendants = self
                .folder_repo
                .find_descendants(ctx.owner_id, folder.id)
                .await?;
            let ids: Vec<Uuid> = descendants.iter().map(|f| f.id).collect();
            if self.folder_repo.count_files_in(ctx.owner_id, &ids).await? > 0 {
                return Err(AppError::not_empty("A subfolder contains files"));
            }

            descendants.sort_by(|a, b| b.depth.cmp(&a.depth));
            ordered.extend(descendants.into_iter().map(|f| f.id));
        }
        ordered.push(folder.id);

        let deleted = self.folder_repo.delete_many(ctx.owner_id, &ordered).await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            deleted,
            recursive,
            "Folder deleted"
        );

        Ok(deleted)
    }
}
