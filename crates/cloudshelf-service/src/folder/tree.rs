//! Folder tree building.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use cloudshelf_core::result::AppResult;
use cloudshelf_database::repositories::FolderRepository;
use cloudshelf_entity::folder::{FolderNode, FolderTree, LogicalFolder};

use super::resolver::PathResolver;
use crate::context::RequestContext;

/// Builds folder trees.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Path resolver.
    resolver: Arc<PathResolver>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folder_repo: Arc<FolderRepository>, resolver: Arc<PathResolver>) -> Self {
        Self {
            folder_repo,
            resolver,
        }
    }

    /// Builds the descendant tree of a folder (the root when `None`).
    pub async fn get_tree(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
    ) -> AppResult<FolderTree> {
        let parent = match parent_id {
            Some(id) => self.resolver.owned_folder(ctx, id).await?,
            None => self.resolver.root(ctx).await?,
        };

        let descendants = self
            .folder_repo
            .find_descendants(ctx.owner_id, parent.id)
            .await?;
        if descendants.is_empty() {
            return Ok(FolderTree::empty(parent.id));
        }

        let ids: Vec<Uuid> = descendants.iter().map(|f| f.id).collect();
        let file_counts = self
            .folder_repo
            .count_completed_files_batch(ctx.owner_id, &ids)
            .await?;

        Ok(build_tree(&parent, &descendants, &file_counts))
    }
}

/// Assemble a tree from a flat descendant list.
pub fn build_tree(
    parent: &LogicalFolder,
    descendants: &[LogicalFolder],
    file_counts: &HashMap<Uuid, u64>,
) -> FolderTree {
    let mut by_parent: HashMap<Uuid, Vec<&LogicalFolder>> = HashMap::new();
    for folder in descendants {
        if let Some(parent_id) = folder.parent_id {
            by_parent.entry(parent_id).or_default().push(folder);
        }
    }

    FolderTree {
        parent_id: parent.id,
        roots: build_nodes(parent.id, parent.depth, &by_parent, file_counts),
        total_folders: descendants.len() as u64,
    }
}

fn build_nodes(
    parent_id: Uuid,
    base_depth: i32,
    by_parent: &HashMap<Uuid, Vec<&LogicalFolder>>,
    file_counts: &HashMap<Uuid, u64>,
) -> Vec<FolderNode> {
    let Some(children) = by_parent.get(&parent_id) else {
        return Vec::new();
    };

    children
        .iter()
        .map(|folder| {
            let nodes = build_nodes(folder.id, base_depth, by_parent, file_counts);
            FolderNode {
                id: folder.id,
                name: folder.name.clone(),
                path: folder.full_path.clone(),
                level: folder.depth - base_depth,
                color: folder.color.clone(),
                subfolder_count: nodes.len() as u64,
                file_count: file_counts.get(&folder.id).copied().unwrap_or(0),
                children: nodes,
            }
        })
        .collect()
}
