//! Path resolution and root folder bootstrap.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use cloudshelf_core::error::{AppError, ErrorKind};
use cloudshelf_core::result::AppResult;
use cloudshelf_database::repositories::FolderRepository;
use cloudshelf_entity::folder::{CreateFolder, LogicalFolder, ROOT_FOLDER_NAME, ROOT_PATH};

use crate::context::RequestContext;

/// Where an operation should land: an explicit folder, a path, or the root.
#[derive(Debug, Clone, Default)]
pub struct FolderTarget {
    /// Explicit folder ID; wins over `path`.
    pub folder_id: Option<Uuid>,
    /// Slash-delimited path below the root.
    pub path: Option<String>,
}

impl FolderTarget {
    /// Target the owner's root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Target a folder by ID.
    pub fn id(folder_id: Uuid) -> Self {
        Self {
            folder_id: Some(folder_id),
            path: None,
        }
    }

    /// Target a folder by path.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            folder_id: None,
            path: Some(path.into()),
        }
    }
}

/// Split a user path into trimmed, non-empty segments.
pub fn normalize_path(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Translates user-facing paths into logical folders.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
}

impl PathResolver {
    /// Creates a new path resolver.
    pub fn new(folder_repo: Arc<FolderRepository>) -> Self {
        Self { folder_repo }
    }

    /// Returns the owner's root folder, creating it on first access.
    ///
    /// Concurrent first calls race on the one-root-per-owner index; the
    /// loser re-reads the winner's row.
    pub async fn root(&self, ctx: &RequestContext) -> AppResult<LogicalFolder> {
        if let Some(root) = self.folder_repo.find_root(ctx.owner_id).await? {
            return Ok(root);
        }

        let data = CreateFolder {
            owner_id: ctx.owner_id,
            parent_id: None,
            name: ROOT_FOLDER_NAME.to_string(),
            full_path: ROOT_PATH.to_string(),
            depth: 0,
            is_system: true,
            color: None,
            description: None,
        };

        match self.folder_repo.create(&data).await {
            Ok(root) => {
                info!(owner_id = %ctx.owner_id, folder_id = %root.id, "Root folder created");
                Ok(root)
            }
            Err(e) if e.kind == ErrorKind::DuplicateName => self
                .folder_repo
                .find_root(ctx.owner_id)
                .await?
                .ok_or_else(|| AppError::internal("Root folder vanished after creation race")),
            Err(e) => Err(e),
        }
    }

    /// Resolve a path to a folder.
    ///
    /// An empty path is the root. `None` means some segment did not match;
    /// missing folders are never created.
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> AppResult<Option<LogicalFolder>> {
        let mut current = self.root(ctx).await?;

        for segment in normalize_path(path) {
            match self
                .folder_repo
                .find_child_by_name(ctx.owner_id, current.id, segment)
                .await?
            {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// Resolve a path, failing with `NotFound` when it does not exist.
    pub async fn resolve_existing(
        &self,
        ctx: &RequestContext,
        path: &str,
    ) -> AppResult<LogicalFolder> {
        self.resolve(ctx, path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder path '{path}' not found")))
    }

    /// Load a folder the requester owns.
    ///
    /// A folder that exists under another owner is `PermissionDenied`;
    /// one that does not exist at all is `NotFound`.
    pub async fn owned_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<LogicalFolder> {
        if let Some(folder) = self.folder_repo.find_by_id(ctx.owner_id, folder_id).await? {
            return Ok(folder);
        }

        if self.folder_repo.exists_any_owner(folder_id).await? {
            Err(AppError::permission_denied(
                "Folder belongs to another owner",
            ))
        } else {
            Err(AppError::not_found(format!("Folder {folder_id} not found")))
        }
    }

    /// Resolve an operation target to a folder.
    pub async fn target(
        &self,
        ctx: &RequestContext,
        target: &FolderTarget,
    ) -> AppResult<LogicalFolder> {
        match (&target.folder_id, &target.path) {
            (Some(id), _) => self.owned_folder(ctx, *id).await,
            (None, Some(path)) => self.resolve_existing(ctx, path).await,
            (None, None) => self.root(ctx).await,
        }
    }
}
