//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use cloudshelf_api::AppState;
use cloudshelf_api::extractors::Claims;
use cloudshelf_core::config::{AppConfig, DatabaseConfig};
use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_core::traits::thumbnail::{ThumbnailKind, ThumbnailPipeline};
use cloudshelf_database::DatabasePool;
use cloudshelf_database::migration::run_migrations;
use cloudshelf_service::{RequestContext, UploadItem};
use cloudshelf_storage::{ImageThumbnailer, MemoryObjectStore, UrlSigner};

/// Secret shared by the test token issuer and the verifier.
pub const JWT_SECRET: &str = "integration-test-secret";

/// Knobs for building a [`TestApp`].
#[derive(Default)]
pub struct TestAppOptions {
    /// Storage folder capacity; the configured default when unset.
    pub max_files_per_folder: Option<i64>,
    /// Replacement object store. The in-memory store is still created and
    /// should be wrapped by the replacement.
    pub store: Option<Arc<dyn ObjectStore>>,
    /// Replacement thumbnail pipeline.
    pub thumbnails: Option<Arc<dyn ThumbnailPipeline>>,
}

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Wired services
    pub state: AppState,
    /// Database pool for direct queries
    pub db_pool: SqlitePool,
    /// In-memory object store
    pub memory: Arc<MemoryObjectStore>,
    /// Application config
    pub config: AppConfig,
    /// Keeps the database directory alive
    _dir: TempDir,
}

impl TestApp {
    /// Create a test application with default settings
    pub async fn new() -> Self {
        Self::with_options(TestAppOptions::default()).await
    }

    /// Create a test application with small storage folders
    pub async fn with_max_files(max_files_per_folder: i64) -> Self {
        Self::with_options(TestAppOptions {
            max_files_per_folder: Some(max_files_per_folder),
            ..TestAppOptions::default()
        })
        .await
    }

    /// Create a test application around a store built from the in-memory store
    pub async fn with_store<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<MemoryObjectStore>) -> Arc<dyn ObjectStore>,
    {
        let memory = Arc::new(MemoryObjectStore::new(test_signer()));
        let store = wrap(Arc::clone(&memory));
        Self::build(
            TestAppOptions {
                store: Some(store),
                ..TestAppOptions::default()
            },
            memory,
        )
        .await
    }

    /// Create a test application with explicit options
    pub async fn with_options(options: TestAppOptions) -> Self {
        let memory = Arc::new(MemoryObjectStore::new(test_signer()));
        Self::build(options, memory).await
    }

    async fn build(options: TestAppOptions, memory: Arc<MemoryObjectStore>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.database = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("cloudshelf.db").display()),
            max_connections: 8,
            ..DatabaseConfig::default()
        };
        config.auth.jwt_secret = JWT_SECRET.to_string();
        config.upload.batch_pause_ms = 0;
        config.storage.public_base_url = "http://test.local/api/objects".to_string();
        config.storage.signing_secret = "test-signing-secret".to_string();
        if let Some(max) = options.max_files_per_folder {
            config.storage.max_files_per_folder = max;
        }

        let db_pool = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database")
            .into_pool();
        run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");

        let store = options
            .store
            .unwrap_or_else(|| Arc::clone(&memory) as Arc<dyn ObjectStore>);
        let thumbnails = options
            .thumbnails
            .unwrap_or_else(|| Arc::new(ImageThumbnailer::from_config(&config.upload)));

        let state = AppState::new(config.clone(), db_pool.clone(), store, thumbnails);
        let router = cloudshelf_api::build_app(state.clone());

        Self {
            router,
            state,
            db_pool,
            memory,
            config,
            _dir: dir,
        }
    }

    /// A fresh owner identity
    pub fn owner(&self) -> RequestContext {
        RequestContext::new(Uuid::new_v4())
    }

    /// Issue a bearer token for an owner
    pub fn token_for(&self, owner_id: Uuid) -> String {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: owner_id.to_string(),
            exp: now + 3600,
            iat: Some(now),
            iss: None,
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    /// Upload files into the root and return the stored records
    pub async fn upload_to_root(
        &self,
        ctx: &RequestContext,
        items: Vec<UploadItem>,
    ) -> Vec<cloudshelf_entity::file::UploadedFile> {
        self.state
            .upload_service
            .upload_batch(ctx, &cloudshelf_service::FolderTarget::root(), items)
            .await
            .expect("Upload batch failed")
            .into_iter()
            .map(|o| o.file.expect("Upload item failed"))
            .collect()
    }

    /// Number of rows in a table
    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db_pool)
            .await
            .expect("Failed to count rows")
    }

    /// Make every metadata insert fail
    pub async fn break_file_inserts(&self) {
        sqlx::query(
            "CREATE TRIGGER fail_file_insert BEFORE INSERT ON uploaded_files \
             BEGIN SELECT RAISE(ABORT, 'metadata insert disabled'); END",
        )
        .execute(&self.db_pool)
        .await
        .expect("Failed to install trigger");
    }

    /// Make an HTTP request with a JSON body
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Make a multipart upload request
    pub async fn upload_request(
        &self,
        path: &str,
        form: MultipartForm,
        token: Option<&str>,
    ) -> TestResponse {
        let (content_type, body) = form.finish();

        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");
        self.send(req).await
    }

    /// Make a raw GET and return status plus bytes
    pub async fn get_raw(&self, path: &str) -> (StatusCode, Bytes) {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        (status, bytes)
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Minimal multipart/form-data builder
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("cloudshelf-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    /// Add a text field
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file part
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// URL signer matching the test configuration
pub fn test_signer() -> UrlSigner {
    UrlSigner::new("test-signing-secret", "http://test.local/api/objects")
}

/// A PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    Bytes::from(buffer.into_inner())
}

/// An upload item with a plain-text body
pub fn text_item(filename: &str, body: &str) -> UploadItem {
    UploadItem {
        filename: filename.to_string(),
        content_type: Some("text/plain".to_string()),
        data: Bytes::from(body.to_string()),
    }
}

/// An upload item holding a small PNG
pub fn image_item(filename: &str) -> UploadItem {
    UploadItem {
        filename: filename.to_string(),
        content_type: Some("image/png".to_string()),
        data: png_bytes(64, 48),
    }
}

/// Object store that rejects writes to one bucket
#[derive(Debug)]
pub struct FailingStore {
    pub inner: Arc<MemoryObjectStore>,
    pub fail_bucket: String,
}

#[async_trait]
impl ObjectStore for FailingStore {
    fn provider_type(&self) -> &str {
        "failing"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }

    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<String> {
        if bucket == self.fail_bucket {
            return Err(AppError::upstream(format!("Bucket {bucket} is read-only")));
        }
        self.inner.put(bucket, path, data, content_type).await
    }

    async fn get(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        self.inner.get(bucket, path).await
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> AppResult<()> {
        self.inner.remove(bucket, paths).await
    }

    async fn sign(&self, bucket: &str, path: &str, ttl: Duration) -> AppResult<String> {
        self.inner.sign(bucket, path, ttl).await
    }
}

/// Object store that waits before every write, widening race windows
#[derive(Debug)]
pub struct SlowStore {
    pub inner: MemoryObjectStore,
    pub delay: Duration,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryObjectStore::new(test_signer()),
            delay,
        }
    }
}

#[async_trait]
impl ObjectStore for SlowStore {
    fn provider_type(&self) -> &str {
        "slow"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn put(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<String> {
        tokio::time::sleep(self.delay).await;
        self.inner.put(bucket, path, data, content_type).await
    }

    async fn get(&self, bucket: &str, path: &str) -> AppResult<Bytes> {
        self.inner.get(bucket, path).await
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> AppResult<()> {
        self.inner.remove(bucket, paths).await
    }

    async fn sign(&self, bucket: &str, path: &str, ttl: Duration) -> AppResult<String> {
        self.inner.sign(bucket, path, ttl).await
    }
}

/// Thumbnail pipeline whose codec always fails
#[derive(Debug)]
pub struct BrokenThumbnailer;

#[async_trait]
impl ThumbnailPipeline for BrokenThumbnailer {
    async fn generate(&self, _kind: ThumbnailKind, _data: Bytes) -> AppResult<Bytes> {
        Err(AppError::thumbnail("codec unavailable"))
    }
}
