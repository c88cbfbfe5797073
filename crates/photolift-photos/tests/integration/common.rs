//! Shared test helpers for Photos Library integration tests
//!
//! Each helper mounts the endpoints a test needs on a wiremock server and
//! returns adapters pointing at it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use photolift_core::domain::{MediaFile, RunStats, UploadError};
use photolift_core::ports::{ICodeExchanger, ICredentialProvider, IMigrationReporter};
use photolift_photos::client::PhotosClient;
use photolift_photos::provider::PhotosLibraryProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const UPLOAD_PATH: &str = "/v1/uploads";
pub const BATCH_CREATE_PATH: &str = "/v1/mediaItems:batchCreate";
pub const TOKEN_PATH: &str = "/token";

/// Starts a mock server and returns a provider pointed at it
pub async fn setup_photos_mock() -> (MockServer, PhotosLibraryProvider) {
    let server = MockServer::start().await;
    let client = PhotosClient::with_endpoints(
        format!("{}{}", server.uri(), UPLOAD_PATH),
        format!("{}/v1", server.uri()),
    );
    (server, PhotosLibraryProvider::new(client))
}

/// Mounts an upload endpoint answering 200 with `token` as the body
pub async fn mount_upload_ok(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(token))
        .mount(server)
        .await;
}

/// Mounts a batchCreate endpoint answering 200 with a single successful item
pub async fn mount_batch_create_ok(server: &MockServer) {
    mount_batch_create_json(
        server,
        serde_json::json!({
            "newMediaItemResults": [{
                "uploadToken": "upload-token-001",
                "status": {"message": "Success"},
                "mediaItem": {"id": "media-item-001", "filename": "photo.jpg"}
            }]
        }),
    )
    .await;
}

/// Mounts a batchCreate endpoint answering 200 with the given JSON body
pub async fn mount_batch_create_json(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(BATCH_CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a token endpoint answering with the given JSON body
pub async fn mount_token(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Writes a file under `dir` and returns its absolute path
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Classifies a file written by [`write_file`]
pub fn media_file(path: &Path) -> MediaFile {
    let size = std::fs::metadata(path).unwrap().len();
    MediaFile::classify(path, size).unwrap()
}

/// Credential provider returning a fixed token
pub struct StaticCredentials;

#[async_trait::async_trait]
impl ICredentialProvider for StaticCredentials {
    async fn access_token(&self) -> anyhow::Result<String> {
        Ok("test-access-token".to_string())
    }
}

/// Code exchanger that records the consent URL and returns a fixed code
#[derive(Default)]
pub struct FakeExchanger {
    code: String,
    pub seen_url: Mutex<Option<String>>,
}

impl FakeExchanger {
    pub fn returning(code: &str) -> Self {
        Self {
            code: code.to_string(),
            seen_url: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl ICodeExchanger for FakeExchanger {
    async fn request_code(&self, auth_url: &str) -> anyhow::Result<String> {
        *self.seen_url.lock().unwrap() = Some(auth_url.to_string());
        Ok(self.code.clone())
    }
}

/// Code exchanger that fails the test if consent is requested
pub struct NoConsent;

#[async_trait::async_trait]
impl ICodeExchanger for NoConsent {
    async fn request_code(&self, auth_url: &str) -> anyhow::Result<String> {
        panic!("unexpected consent request: {}", auth_url);
    }
}

/// Reporter that discards every event
pub struct QuietReporter;

impl IMigrationReporter for QuietReporter {
    fn nothing_to_upload(&self) {}
    fn run_started(&self, _total: usize) {}
    fn eta(&self, _remaining: Duration, _files_left: usize) {}
    fn file_started(&self, _index: usize, _total: usize, _path: &Path, _last_success: Option<&Path>) {}
    fn upload_started(&self, _file: &MediaFile) {}
    fn upload_progress(&self, _file: &MediaFile, _sent: u64, _total: u64) {}
    fn upload_finished(&self, _file: &MediaFile) {}
    fn finalizing(&self, _file: &MediaFile) {}
    fn file_finished(&self, _path: &Path, _outcome: &Result<MediaFile, UploadError>) {}
    fn run_finished(&self, _stats: &RunStats) {}
}
