//! End-to-end migration runs against the mock library
//!
//! Wires the real provider, local media adapter and file-backed
//! uploaded-log together exactly as the CLI does.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use photolift_core::ports::IUploadLog;
use photolift_core::usecases::{MigrateUseCase, UploadMediaUseCase};
use photolift_local::{FileUploadLog, LocalMediaAdapter};
use photolift_photos::provider::PhotosLibraryProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn migrate(provider: PhotosLibraryProvider, log_path: &Path) -> (MigrateUseCase, Arc<FileUploadLog>) {
    let media = Arc::new(LocalMediaAdapter::new());
    let log = Arc::new(FileUploadLog::new(log_path));
    let reporter = Arc::new(common::QuietReporter);
    let pipeline = Arc::new(UploadMediaUseCase::new(
        Arc::new(common::StaticCredentials),
        Arc::new(provider),
        media.clone(),
        log.clone(),
        reporter.clone(),
    ));
    let usecase = MigrateUseCase::new(pipeline, media, log.clone(), reporter, Duration::ZERO);
    (usecase, log)
}

#[tokio::test]
async fn test_run_uploads_media_and_skips_other_files() {
    let (server, provider) = common::setup_photos_mock().await;
    common::mount_upload_ok(&server, "upload-token-001").await;
    common::mount_batch_create_ok(&server).await;

    let media_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    let a = common::write_file(media_dir.path(), "2019/a.jpg", b"jpeg bytes");
    let b = common::write_file(media_dir.path(), "2020/b.mov", b"video bytes");
    common::write_file(media_dir.path(), "notes.txt", b"not media");

    let log_path = state_dir.path().join("uploaded_files.txt");
    let (usecase, log) = migrate(provider, &log_path);

    let stats = usecase.run(media_dir.path()).await.expect("run failed");
    assert_eq!(stats.attempted, 3);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.failed, 0);

    let logged = log.load().await.unwrap();
    assert_eq!(logged.len(), 2);
    assert!(logged.contains(&a));
    assert!(logged.contains(&b));

    // Two uploads and two batchCreate calls; the text file never hit the network
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_second_run_only_retries_unlogged_files() {
    let (server, provider) = common::setup_photos_mock().await;
    common::mount_upload_ok(&server, "upload-token-001").await;
    common::mount_batch_create_ok(&server).await;

    let media_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    common::write_file(media_dir.path(), "a.jpg", b"a");
    common::write_file(media_dir.path(), "b.png", b"b");
    common::write_file(media_dir.path(), "readme.md", b"r");

    let log_path = state_dir.path().join("uploaded_files.txt");
    let (usecase, _log) = migrate(provider.clone(), &log_path);
    usecase.run(media_dir.path()).await.unwrap();

    // The skipped file is attempted again; the uploaded ones are not
    let (usecase, _log) = migrate(provider, &log_path);
    let stats = usecase.run(media_dir.path()).await.unwrap();
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.succeeded, 0);
}

#[tokio::test]
async fn test_rejected_and_rate_limited_files_are_not_logged() {
    let (server, provider) = common::setup_photos_mock().await;
    common::mount_upload_ok(&server, "upload-token-001").await;
    Mock::given(method("POST"))
        .and(path(common::BATCH_CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "newMediaItemResults": [{"status": {"code": 7, "message": "Failed"}}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(common::BATCH_CREATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let media_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    common::write_file(media_dir.path(), "a.jpg", b"a");
    common::write_file(media_dir.path(), "b.jpg", b"b");

    let log_path = state_dir.path().join("uploaded_files.txt");
    let (usecase, log) = migrate(provider, &log_path);
    let stats = usecase.run(media_dir.path()).await.unwrap();

    assert_eq!(stats.attempted, 2);
    assert_eq!(stats.succeeded, 0);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.rate_limited, 1);
    assert!(log.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_200_upload_is_never_finalized() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string("upload-token-201"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(common::BATCH_CREATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let media_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    common::write_file(media_dir.path(), "a.jpg", b"a");

    let log_path = state_dir.path().join("uploaded_files.txt");
    let (usecase, log) = migrate(provider, &log_path);
    let stats = usecase.run(media_dir.path()).await.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded, 0);
    assert!(log.load().await.unwrap().is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_empty_tree_makes_no_requests() {
    let (server, provider) = common::setup_photos_mock().await;

    let media_dir = tempfile::tempdir().unwrap();
    let state_dir = tempfile::tempdir().unwrap();
    let (usecase, _log) = migrate(provider, &state_dir.path().join("uploaded_files.txt"));

    let stats = usecase.run(media_dir.path()).await.unwrap();
    assert_eq!(stats.attempted, 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}
