//! Integration tests for the raw upload and batchCreate calls

use std::sync::{Arc, Mutex};

use photolift_core::domain::{NewMediaItem, RateLimitStage, UploadError, UploadToken};
use photolift_core::ports::{IPhotosLibrary, ProgressCallback};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_upload_sends_raw_bytes_and_returns_token() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .and(header("authorization", "Bearer test-access-token"))
        .and(header("content-type", "application/octet-stream"))
        .and(header("x-goog-upload-protocol", "raw"))
        .and(header("x-goog-upload-file-name", "beach.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("upload-token-001"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let content = vec![42u8; 600 * 1024];
    let path = common::write_file(dir.path(), "beach.jpg", &content);
    let file = common::media_file(&path);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressCallback = Box::new(move |sent, total| {
        sink.lock().unwrap().push((sent, total));
    });

    let token = provider
        .upload_bytes("test-access-token", &file, Some(progress))
        .await
        .expect("upload failed");
    assert_eq!(token.as_str(), "upload-token-001");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, content);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.last(), Some(&(content.len() as u64, content.len() as u64)));
}

#[tokio::test]
async fn test_upload_429_is_rate_limited() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = common::media_file(&common::write_file(dir.path(), "a.png", b"png"));

    let err = provider
        .upload_bytes("test-access-token", &file, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UploadError::RateLimited {
            stage: RateLimitStage::Upload
        }
    ));
}

#[tokio::test]
async fn test_upload_error_status_carries_body() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = common::media_file(&common::write_file(dir.path(), "a.mp4", b"mp4"));

    match provider.upload_bytes("test-access-token", &file, None).await {
        Err(UploadError::Transport { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_requires_exactly_200() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(201).set_body_string("upload-token-201"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = common::media_file(&common::write_file(dir.path(), "a.jpg", b"jpeg"));

    match provider.upload_bytes("test-access-token", &file, None).await {
        Err(UploadError::Transport { status, body }) => {
            assert_eq!(status, 201);
            assert_eq!(body, "upload-token-201");
        }
        other => panic!("expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_blank_body_is_missing_token() {
    let (server, provider) = common::setup_photos_mock().await;
    common::mount_upload_ok(&server, "  \n").await;

    let dir = tempfile::tempdir().unwrap();
    let file = common::media_file(&common::write_file(dir.path(), "a.gif", b"gif"));

    let err = provider
        .upload_bytes("test-access-token", &file, None)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::MissingUploadToken));
}

#[tokio::test]
async fn test_batch_create_sends_single_item() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::BATCH_CREATE_PATH))
        .and(header("authorization", "Bearer test-access-token"))
        .and(body_json(serde_json::json!({
            "newMediaItems": [
                {"simpleMediaItem": {"fileName": "photo.jpg", "uploadToken": "upload-token-001"}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "newMediaItemResults": [{
                "uploadToken": "upload-token-001",
                "status": {"message": "Success"},
                "mediaItem": {"id": "media-item-001"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = NewMediaItem::new("photo.jpg", UploadToken::new("upload-token-001"));
    let results = provider
        .create_media_item("test-access-token", &item)
        .await
        .expect("batchCreate failed");

    assert_eq!(results.len(), 1);
    assert!(results[0].status.is_success());
    assert_eq!(results[0].media_item_id.as_deref(), Some("media-item-001"));
}

#[tokio::test]
async fn test_batch_create_reports_item_failure_status() {
    let (server, provider) = common::setup_photos_mock().await;
    common::mount_batch_create_json(
        &server,
        serde_json::json!({
            "newMediaItemResults": [{
                "uploadToken": "upload-token-001",
                "status": {"code": 7, "message": "Failed"}
            }]
        }),
    )
    .await;

    let item = NewMediaItem::new("photo.jpg", UploadToken::new("upload-token-001"));
    let results = provider
        .create_media_item("test-access-token", &item)
        .await
        .unwrap();

    assert_eq!(results[0].status.code, Some(7));
    assert_eq!(results[0].status.message.as_deref(), Some("Failed"));
    assert!(!results[0].status.is_success());
}

#[tokio::test]
async fn test_batch_create_empty_results() {
    let (server, provider) = common::setup_photos_mock().await;
    common::mount_batch_create_json(&server, serde_json::json!({})).await;

    let item = NewMediaItem::new("photo.jpg", UploadToken::new("t"));
    let results = provider
        .create_media_item("test-access-token", &item)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_batch_create_429_is_rate_limited() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::BATCH_CREATE_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let item = NewMediaItem::new("photo.jpg", UploadToken::new("t"));
    let err = provider
        .create_media_item("test-access-token", &item)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UploadError::RateLimited {
            stage: RateLimitStage::BatchCreate
        }
    ));
}

#[tokio::test]
async fn test_batch_create_invalid_json_is_protocol_error() {
    let (server, provider) = common::setup_photos_mock().await;
    Mock::given(method("POST"))
        .and(path(common::BATCH_CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let item = NewMediaItem::new("photo.jpg", UploadToken::new("t"));
    let err = provider
        .create_media_item("test-access-token", &item)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Protocol(_)));
}
