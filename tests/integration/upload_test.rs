//! Integration tests for the upload pipeline.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use cloudshelf_core::error::ErrorKind;
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_entity::file::{FileQuery, FileType, UploadStatus};
use cloudshelf_service::{CreateFolderRequest, FolderTarget, UploadItem};
use helpers::{BrokenThumbnailer, FailingStore, TestApp, TestAppOptions};

const ORIGINALS: &str = "originals";
const THUMBNAILS: &str = "thumbnails";

#[tokio::test]
async fn test_three_files_land_in_root_and_first_storage_folder() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let mut uploaded = Vec::new();
    for name in ["a.txt", "b.txt", "c.txt"] {
        uploaded.extend(app.upload_to_root(&ctx, vec![helpers::text_item(name, name)]).await);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let root = app.state.folder_service.get_or_create_root(&ctx).await.unwrap();
    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.folders.len(), 1);
    let storage = &usage.folders[0];
    assert_eq!(storage.reserved_count, 0);
    assert_eq!(storage.storage_path, format!("{}/folder_000", ctx.owner_id));

    for file in &uploaded {
        assert_eq!(file.folder_id, root.id);
        assert_eq!(file.storage_folder_id, storage.id);
        assert_eq!(file.upload_status, UploadStatus::Completed);
        assert!(file.file_path.starts_with(&storage.storage_path));
    }
    assert_eq!(storage.file_count, 3);

    let content = app
        .state
        .content_service
        .resolve_content(&ctx, "", &FileQuery::default())
        .await
        .unwrap();
    let names: Vec<_> = content
        .files
        .iter()
        .map(|f| f.file.original_filename.as_str())
        .collect();
    assert_eq!(names, vec!["c.txt", "b.txt", "a.txt"]);
}

#[tokio::test]
async fn test_record_fields_are_derived() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let file = app
        .upload_to_root(&ctx, vec![helpers::text_item("../Report.TXT", "quarterly")])
        .await
        .remove(0);

    assert_eq!(file.original_filename, "_Report.TXT");
    assert_eq!(file.display_filename, file.original_filename);
    assert_eq!(file.mime_type, "text/plain");
    assert_eq!(file.file_type, FileType::Document);
    assert_eq!(file.file_size, 9);
    assert!(!file.has_thumbnail);
    assert!(file.thumbnail_path.is_none());
    assert!(file.stored_filename.ends_with(".txt"));
    assert_eq!(
        file.file_path,
        format!(
            "{}/folder_000/{}",
            ctx.owner_id, file.stored_filename
        )
    );

    let bytes = app.memory.get(ORIGINALS, &file.file_path).await.unwrap();
    assert_eq!(bytes, Bytes::from_static(b"quarterly"));
}

#[tokio::test]
async fn test_image_upload_stores_thumbnail() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let file = app
        .upload_to_root(&ctx, vec![helpers::image_item("holiday.png")])
        .await
        .remove(0);

    assert_eq!(file.file_type, FileType::Image);
    assert!(file.has_thumbnail);
    let thumb_path = file.thumbnail_path.clone().unwrap();
    assert!(thumb_path.starts_with(&format!("{}/thumbnails/folder_000/thumb_", ctx.owner_id)));
    assert!(thumb_path.ends_with(".jpg"));

    let thumb = app.memory.get(THUMBNAILS, &thumb_path).await.unwrap();
    assert_eq!(file.thumbnail_size, Some(thumb.len() as i64));
    assert_eq!(
        app.memory.content_type(THUMBNAILS, &thumb_path).await.as_deref(),
        Some("image/jpeg")
    );

    let view = app.state.file_service.get_file(&ctx, file.id).await.unwrap();
    assert!(view.url.is_some());
    assert!(view.thumbnail_url.unwrap().contains("/thumbnails/"));
}

#[tokio::test]
async fn test_heic_without_decoder_aborts_that_file_only() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let outcomes = app
        .state
        .upload_service
        .upload_batch(
            &ctx,
            &FolderTarget::root(),
            vec![
                UploadItem {
                    filename: "IMG_0001.HEIC".to_string(),
                    content_type: Some("image/heic".to_string()),
                    data: Bytes::from_static(b"not really heic"),
                },
                helpers::text_item("notes.txt", "ok"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].success);
    assert_eq!(
        outcomes[0].error.as_ref().unwrap().code,
        ErrorKind::Thumbnail.code()
    );
    assert!(outcomes[1].success);

    assert_eq!(app.count_rows("uploaded_files").await, 1);
    assert!(app.memory.is_empty(THUMBNAILS).await);
    assert_eq!(app.memory.len(ORIGINALS).await, 1);
}

#[tokio::test]
async fn test_thumbnail_failure_leaves_nothing_behind() {
    let app = TestApp::with_options(TestAppOptions {
        thumbnails: Some(Arc::new(BrokenThumbnailer)),
        ..TestAppOptions::default()
    })
    .await;
    let ctx = app.owner();

    let outcomes = app
        .state
        .upload_service
        .upload_batch(&ctx, &FolderTarget::root(), vec![helpers::image_item("a.png")])
        .await
        .unwrap();

    assert!(!outcomes[0].success);
    assert_eq!(app.count_rows("uploaded_files").await, 0);
    assert!(app.memory.is_empty(ORIGINALS).await);
    assert!(app.memory.is_empty(THUMBNAILS).await);

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.total_files, 0);
    assert!(usage.folders.iter().all(|f| f.reserved_count == 0 && f.is_active));
}

#[tokio::test]
async fn test_original_upload_failure_removes_thumbnail() {
    let app = TestApp::with_store(|memory| {
        Arc::new(FailingStore {
            inner: memory,
            fail_bucket: ORIGINALS.to_string(),
        }) as Arc<dyn ObjectStore>
    })
    .await;
    let ctx = app.owner();

    let outcomes = app
        .state
        .upload_service
        .upload_batch(&ctx, &FolderTarget::root(), vec![helpers::image_item("a.png")])
        .await
        .unwrap();

    assert!(!outcomes[0].success);
    assert_eq!(
        outcomes[0].error.as_ref().unwrap().code,
        ErrorKind::Upstream.code()
    );
    assert!(app.memory.is_empty(THUMBNAILS).await);
    assert_eq!(app.count_rows("uploaded_files").await, 0);

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert!(usage.folders.iter().all(|f| f.reserved_count == 0));
}

#[tokio::test]
async fn test_metadata_failure_rolls_back_bytes() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    app.break_file_inserts().await;

    let outcomes = app
        .state
        .upload_service
        .upload_batch(
            &ctx,
            &FolderTarget::root(),
            vec![helpers::image_item("a.png"), helpers::text_item("b.txt", "b")],
        )
        .await
        .unwrap();

    assert!(outcomes.iter().all(|o| !o.success));
    assert!(
        outcomes
            .iter()
            .all(|o| o.error.as_ref().unwrap().code == ErrorKind::Database.code())
    );

    assert_eq!(app.count_rows("uploaded_files").await, 0);
    assert!(app.memory.is_empty(ORIGINALS).await);
    assert!(app.memory.is_empty(THUMBNAILS).await);

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.total_files, 0);
    assert_eq!(usage.total_bytes, 0);
    assert!(usage.folders.iter().all(|f| f.reserved_count == 0));
}

#[tokio::test]
async fn test_batch_reports_in_input_order() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let items: Vec<_> = (0..12)
        .map(|i| helpers::text_item(&format!("file{i:02}.txt"), "x"))
        .collect();
    let outcomes = app
        .state
        .upload_service
        .upload_batch(&ctx, &FolderTarget::root(), items)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 12);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert!(outcome.success);
        assert_eq!(outcome.filename, format!("file{i:02}.txt"));
        assert_eq!(
            outcome.file.as_ref().unwrap().original_filename,
            outcome.filename
        );
    }

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.total_files, 12);
    assert_eq!(usage.total_bytes, 12);
}

#[tokio::test]
async fn test_upload_to_path_target() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let trips = app
        .state
        .folder_service
        .create_folder(
            &ctx,
            CreateFolderRequest {
                name: "Trips".to_string(),
                ..CreateFolderRequest::default()
            },
        )
        .await
        .unwrap();

    let outcomes = app
        .state
        .upload_service
        .upload_batch(
            &ctx,
            &FolderTarget::path("/Trips/"),
            vec![helpers::text_item("plan.txt", "go")],
        )
        .await
        .unwrap();
    assert_eq!(outcomes[0].file.as_ref().unwrap().folder_id, trips.id);
}

#[tokio::test]
async fn test_unresolvable_target_fails_whole_request() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let err = app
        .state
        .upload_service
        .upload_batch(
            &ctx,
            &FolderTarget::path("Nowhere"),
            vec![helpers::text_item("a.txt", "a")],
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .state
        .upload_service
        .upload_batch(&ctx, &FolderTarget::root(), Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert!(app.memory.is_empty(ORIGINALS).await);
}
