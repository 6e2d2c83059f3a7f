//! Integration tests for file listing, edits, moves, and deletes.

mod helpers;

use cloudshelf_core::error::ErrorKind;
use cloudshelf_core::traits::storage::ObjectStore;
use cloudshelf_core::types::{FileSortField, SortDirection};
use cloudshelf_entity::file::{FileQuery, FileType, UpdateFile};
use cloudshelf_service::{CreateFolderRequest, FolderTarget};
use helpers::TestApp;
use uuid::Uuid;

async fn make_folder(app: &TestApp, ctx: &cloudshelf_service::RequestContext, name: &str) -> Uuid {
    app.state
        .folder_service
        .create_folder(
            ctx,
            CreateFolderRequest {
                name: name.to_string(),
                ..CreateFolderRequest::default()
            },
        )
        .await
        .unwrap()
        .id
}

async fn listed(app: &TestApp, ctx: &cloudshelf_service::RequestContext, path: &str) -> Vec<Uuid> {
    app.state
        .content_service
        .resolve_content(ctx, path, &FileQuery::default())
        .await
        .unwrap()
        .files
        .into_iter()
        .map(|v| v.file.id)
        .collect()
}

#[tokio::test]
async fn test_move_changes_only_logical_folder() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    let archive = make_folder(&app, &ctx, "Archive").await;

    let file = app
        .upload_to_root(&ctx, vec![helpers::image_item("cat.png")])
        .await
        .remove(0);
    let before = app.memory.get("originals", &file.file_path).await.unwrap();
    let usage_before = app.state.allocator.usage(&ctx).await.unwrap();

    let summary = app
        .state
        .file_service
        .move_files(&ctx, &[file.id], &FolderTarget::path("Archive"))
        .await
        .unwrap();
    assert_eq!(summary.moved, 1);
    assert_eq!(summary.target_folder_id, archive);

    let moved = app.state.file_service.get_file(&ctx, file.id).await.unwrap().file;
    assert_eq!(moved.folder_id, archive);
    assert_eq!(moved.storage_folder_id, file.storage_folder_id);
    assert_eq!(moved.file_path, file.file_path);
    assert_eq!(moved.thumbnail_path, file.thumbnail_path);

    let after = app.memory.get("originals", &file.file_path).await.unwrap();
    assert_eq!(before, after);

    let usage_after = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage_before.total_files, usage_after.total_files);
    assert_eq!(usage_before.total_bytes, usage_after.total_bytes);

    assert!(listed(&app, &ctx, "").await.is_empty());
    assert_eq!(listed(&app, &ctx, "Archive").await, vec![file.id]);
}

#[tokio::test]
async fn test_storage_placement_is_write_once() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    let file = app
        .upload_to_root(&ctx, vec![helpers::text_item("a.txt", "a")])
        .await
        .remove(0);

    let result = sqlx::query("UPDATE uploaded_files SET file_path = 'elsewhere' WHERE id = ?")
        .bind(file.id)
        .execute(&app.db_pool)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_move_is_all_or_nothing() {
    let app = TestApp::new().await;
    let alice = app.owner();
    let bob = app.owner();
    let target = make_folder(&app, &alice, "Target").await;

    let mine = app
        .upload_to_root(&alice, vec![helpers::text_item("mine.txt", "m")])
        .await
        .remove(0);
    let theirs = app
        .upload_to_root(&bob, vec![helpers::text_item("theirs.txt", "t")])
        .await
        .remove(0);

    let err = app
        .state
        .file_service
        .move_files(&alice, &[mine.id, theirs.id], &FolderTarget::id(target))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    let unchanged = app.state.file_service.get_file(&alice, mine.id).await.unwrap();
    assert_eq!(unchanged.file.folder_id, mine.folder_id);

    let err = app
        .state
        .file_service
        .move_files(&alice, &[mine.id, Uuid::new_v4()], &FolderTarget::id(target))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_move_into_foreign_folder_is_denied() {
    let app = TestApp::new().await;
    let alice = app.owner();
    let bob = app.owner();
    let bobs_folder = make_folder(&app, &bob, "Bob").await;

    let file = app
        .upload_to_root(&alice, vec![helpers::text_item("a.txt", "a")])
        .await
        .remove(0);

    let err = app
        .state
        .file_service
        .move_files(&alice, &[file.id], &FolderTarget::id(bobs_folder))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn test_delete_removes_row_then_bytes_and_counters() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let files = app
        .upload_to_root(
            &ctx,
            vec![
                helpers::image_item("a.png"),
                helpers::text_item("b.txt", "bbbb"),
            ],
        )
        .await;
    let ids: Vec<_> = files.iter().map(|f| f.id).collect();
    let total: i64 = files.iter().map(|f| f.file_size).sum();

    let summary = app.state.file_service.delete_files(&ctx, &ids).await.unwrap();
    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.released_bytes, total);

    assert_eq!(app.count_rows("uploaded_files").await, 0);
    assert!(app.memory.is_empty("originals").await);
    assert!(app.memory.is_empty("thumbnails").await);

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.total_files, 0);
    assert_eq!(usage.total_bytes, 0);
    assert!(usage.folders[0].is_active);
}

#[tokio::test]
async fn test_repeated_delete_is_not_found_and_does_not_double_release() {
    let app = TestApp::new().await;
    let ctx = app.owner();

    let files = app
        .upload_to_root(
            &ctx,
            vec![
                helpers::text_item("a.txt", "aa"),
                helpers::text_item("b.txt", "bbb"),
            ],
        )
        .await;

    app.state
        .file_service
        .delete_files(&ctx, &[files[0].id])
        .await
        .unwrap();

    let err = app
        .state
        .file_service
        .delete_files(&ctx, &[files[0].id])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.total_files, 1);
    assert_eq!(usage.total_bytes, 3);
}

#[tokio::test]
async fn test_delete_spanning_storage_folders() {
    let app = TestApp::with_max_files(2).await;
    let ctx = app.owner();

    let mut files = Vec::new();
    for i in 0..3 {
        files.extend(
            app.upload_to_root(&ctx, vec![helpers::text_item(&format!("{i}.txt"), "xy")])
                .await,
        );
    }
    assert_ne!(files[0].storage_folder_id, files[2].storage_folder_id);

    let ids: Vec<_> = files.iter().map(|f| f.id).collect();
    app.state.file_service.delete_files(&ctx, &ids).await.unwrap();

    let usage = app.state.allocator.usage(&ctx).await.unwrap();
    assert_eq!(usage.folders.len(), 2);
    assert!(usage.folders.iter().all(|f| f.file_count == 0 && f.total_size == 0));
    assert!(usage.folders.iter().all(|f| f.is_active));
}

#[tokio::test]
async fn test_other_owner_cannot_read_or_delete_files() {
    let app = TestApp::new().await;
    let alice = app.owner();
    let bob = app.owner();

    let file = app
        .upload_to_root(&alice, vec![helpers::text_item("secret.txt", "s")])
        .await
        .remove(0);

    let err = app.state.file_service.get_file(&bob, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    let err = app
        .state
        .file_service
        .delete_files(&bob, &[file.id])
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    let err = app
        .state
        .file_service
        .update_file(
            &bob,
            file.id,
            UpdateFile {
                is_starred: Some(true),
                ..UpdateFile::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PermissionDenied);

    assert!(listed(&app, &bob, "").await.is_empty());
    assert_eq!(listed(&app, &alice, "").await, vec![file.id]);
    assert_eq!(app.memory.len("originals").await, 1);
}

#[tokio::test]
async fn test_update_file_edits_user_fields() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    let file = app
        .upload_to_root(&ctx, vec![helpers::text_item("draft.txt", "d")])
        .await
        .remove(0);

    let view = app
        .state
        .file_service
        .update_file(
            &ctx,
            file.id,
            UpdateFile {
                display_filename: Some("  Final draft.txt ".to_string()),
                is_starred: Some(true),
                tags: Some(vec!["work".into(), " work ".into(), "".into(), "2024".into()]),
            },
        )
        .await
        .unwrap();

    assert_eq!(view.file.display_filename, "Final draft.txt");
    assert_eq!(view.file.original_filename, "draft.txt");
    assert!(view.file.is_starred);
    assert_eq!(view.file.tags.0, vec!["work".to_string(), "2024".to_string()]);

    let err = app
        .state
        .file_service
        .update_file(
            &ctx,
            file.id,
            UpdateFile {
                display_filename: Some("a/b".to_string()),
                ..UpdateFile::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_listing_hides_incomplete_uploads() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    let files = app
        .upload_to_root(
            &ctx,
            vec![helpers::text_item("a.txt", "a"), helpers::text_item("b.txt", "b")],
        )
        .await;

    sqlx::query("UPDATE uploaded_files SET upload_status = 'uploading' WHERE id = ?")
        .bind(files[0].id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    assert_eq!(listed(&app, &ctx, "").await, vec![files[1].id]);
}

#[tokio::test]
async fn test_listing_filters_sorts_and_pages() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    app.upload_to_root(
        &ctx,
        vec![
            helpers::text_item("b.txt", "bb"),
            helpers::image_item("c.png"),
            helpers::text_item("a.txt", "a"),
        ],
    )
    .await;

    let by_name = FileQuery {
        sort_by: FileSortField::Name,
        sort_order: SortDirection::Asc,
        ..FileQuery::default()
    };
    let content = app
        .state
        .content_service
        .resolve_content(&ctx, "", &by_name)
        .await
        .unwrap();
    let names: Vec<_> = content
        .files
        .iter()
        .map(|f| f.file.original_filename.as_str())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.png"]);
    assert!(content.files.iter().all(|f| f.url.is_none()));
    assert!(content.files[2].thumbnail_url.is_some());

    let images = FileQuery {
        file_type: Some(FileType::Image),
        ..FileQuery::default()
    };
    let content = app
        .state
        .content_service
        .resolve_content(&ctx, "", &images)
        .await
        .unwrap();
    assert_eq!(content.files.len(), 1);
    assert_eq!(content.files[0].file.original_filename, "c.png");

    let page = FileQuery {
        limit: 2,
        offset: 2,
        ..by_name
    };
    let content = app
        .state
        .content_service
        .resolve_content(&ctx, "", &page)
        .await
        .unwrap();
    assert_eq!(content.files.len(), 1);
    assert_eq!(content.files[0].file.original_filename, "c.png");
}

#[tokio::test]
async fn test_content_lists_child_folders_by_name() {
    let app = TestApp::new().await;
    let ctx = app.owner();
    make_folder(&app, &ctx, "zeta").await;
    make_folder(&app, &ctx, "Alpha").await;

    let content = app
        .state
        .content_service
        .resolve_content(&ctx, "/", &FileQuery::default())
        .await
        .unwrap();
    let names: Vec<_> = content.folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "zeta"]);
    assert!(content.folders.iter().all(|f| !f.is_system));
}
