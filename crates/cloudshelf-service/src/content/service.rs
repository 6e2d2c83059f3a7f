//! Resolve a path into the folders and files it contains.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cloudshelf_core::result::AppResult;
use cloudshelf_database::repositories::FolderRepository;
use cloudshelf_entity::file::FileQuery;
use cloudshelf_entity::folder::LogicalFolder;

use crate::context::RequestContext;
use crate::file::{FileService, FileView};
use crate::folder::{PathResolver, normalize_path};

/// What a user sees at one path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderContent {
    /// Child folders, by name.
    pub folders: Vec<LogicalFolder>,
    /// Completed files, per the query.
    pub files: Vec<FileView>,
    /// Normalized path of the folder (empty for the root).
    pub current_path: String,
    /// The resolved folder.
    pub folder_id: Uuid,
}

/// Serves folder listings by path.
#[derive(Debug, Clone)]
pub struct ContentService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Path resolver.
    resolver: Arc<PathResolver>,
    /// File service, for signed file views.
    file_service: Arc<FileService>,
}

impl ContentService {
    /// Creates a new content service.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        resolver: Arc<PathResolver>,
        file_service: Arc<FileService>,
    ) -> Self {
        Self {
            folder_repo,
            resolver,
            file_service,
        }
    }

    /// Resolve `path` and list its content. An empty path is the root.
    pub async fn resolve_content(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &FileQuery,
    ) -> AppResult<FolderContent> {
        let folder = self.resolver.resolve_existing(ctx, path).await?;

        let folders = self.folder_repo.find_children(ctx.owner_id, folder.id).await?;
        let files = self
            .file_service
            .list_in_folder(ctx, folder.id, query)
            .await?;

        Ok(FolderContent {
            folders,
            files,
            current_path: normalize_path(path).join("/"),
            folder_id: folder.id,
        })
    }
}
