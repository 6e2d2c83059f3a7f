//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use cloudshelf_core::config::AppConfig;
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_core::traits::thumbnail::ThumbnailPipeline;
use cloudshelf_database::repositories::{FileRepository, FolderRepository, StorageFolderRepository};
use cloudshelf_service::{
    ContentService, FileService, FolderService, LinkSigner, PathResolver, StorageAllocator,
    TreeService, UploadService,
};
use cloudshelf_storage::UrlSigner;

use crate::extractors::TokenVerifier;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db_pool: SqlitePool,
    /// Object store holding originals and thumbnails
    pub store: Arc<dyn ObjectStore>,
    /// Verifier for signed object URLs
    pub url_signer: Arc<UrlSigner>,
    /// Bearer token verifier
    pub token_verifier: Arc<TokenVerifier>,

    // ── Services ─────────────────────────────────────────────
    /// Folder CRUD
    pub folder_service: Arc<FolderService>,
    /// Folder trees
    pub tree_service: Arc<TreeService>,
    /// Content listing by path
    pub content_service: Arc<ContentService>,
    /// Upload pipeline
    pub upload_service: Arc<UploadService>,
    /// File reads, moves, and deletes
    pub file_service: Arc<FileService>,
    /// Storage folder allocator
    pub allocator: Arc<StorageAllocator>,
}

impl AppState {
    /// Wire repositories and services around a pool, an object store, and a
    /// thumbnail pipeline.
    pub fn new(
        config: AppConfig,
        db_pool: SqlitePool,
        store: Arc<dyn ObjectStore>,
        thumbnails: Arc<dyn ThumbnailPipeline>,
    ) -> Self {
        // ── Repositories ─────────────────────────────────────
        let folder_repo = Arc::new(FolderRepository::new(db_pool.clone()));
        let storage_repo = Arc::new(StorageFolderRepository::new(db_pool.clone()));
        let file_repo = Arc::new(FileRepository::new(db_pool.clone()));

        // ── Services ─────────────────────────────────────────
        let resolver = Arc::new(PathResolver::new(Arc::clone(&folder_repo)));
        let allocator = Arc::new(StorageAllocator::new(
            Arc::clone(&storage_repo),
            config.storage.max_files_per_folder,
        ));
        let links = LinkSigner {
            thumbnails_bucket: config.storage.thumbnails_bucket.clone(),
            ttl: Duration::from_secs(config.storage.signed_url_ttl_seconds),
        };

        let folder_service = Arc::new(FolderService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&resolver),
        ));
        let tree_service = Arc::new(TreeService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&resolver),
        ));
        let file_service = Arc::new(FileService::new(
            Arc::clone(&file_repo),
            Arc::clone(&resolver),
            Arc::clone(&allocator),
            Arc::clone(&store),
            links,
        ));
        let content_service = Arc::new(ContentService::new(
            Arc::clone(&folder_repo),
            Arc::clone(&resolver),
            Arc::clone(&file_service),
        ));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&resolver),
            Arc::clone(&allocator),
            Arc::clone(&store),
            thumbnails,
            config.storage.clone(),
            config.upload.clone(),
        ));

        let url_signer = Arc::new(UrlSigner::new(
            &config.storage.signing_secret,
            &config.storage.public_base_url,
        ));
        let token_verifier = Arc::new(TokenVerifier::new(&config.auth));

        Self {
            config: Arc::new(config),
            db_pool,
            store,
            url_signer,
            token_verifier,
            folder_service,
            tree_service,
            content_service,
            upload_service,
            file_service,
            allocator,
        }
    }
}
