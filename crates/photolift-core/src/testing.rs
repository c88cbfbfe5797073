//! In-memory port implementations for use case tests

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{
    ItemStatus, MediaFile, MediaItemResult, NewMediaItem, RunStats, UploadError, UploadToken,
};
use crate::ports::{
    ICredentialProvider, ILocalMedia, IMigrationReporter, IPhotosLibrary, IUploadLog,
    ProgressCallback,
};
use crate::usecases::{MigrateUseCase, UploadMediaUseCase};

pub struct StaticCredentials;

#[async_trait::async_trait]
impl ICredentialProvider for StaticCredentials {
    async fn access_token(&self) -> anyhow::Result<String> {
        Ok("test-token".to_string())
    }
}

// ---------------------------------------------------------------------------
// MockMedia
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockMedia {
    files: Mutex<BTreeMap<PathBuf, u64>>,
    dirs: Mutex<HashSet<PathBuf>>,
}

impl MockMedia {
    pub fn add_file(&self, path: &str, size: u64) {
        self.files.lock().unwrap().insert(PathBuf::from(path), size);
    }

    pub fn add_dir(&self, path: &str) {
        self.dirs.lock().unwrap().insert(PathBuf::from(path));
    }
}

#[async_trait::async_trait]
impl ILocalMedia for MockMedia {
    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool> {
        Ok(self.dirs.lock().unwrap().contains(path))
    }

    async fn file_size(&self, path: &Path) -> anyhow::Result<Option<u64>> {
        Ok(self.files.lock().unwrap().get(path).copied())
    }

    async fn enumerate(
        &self,
        root: &Path,
        exclude: &HashSet<PathBuf>,
    ) -> anyhow::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|p| p.starts_with(root) && !exclude.contains(*p))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockLibrary
// ---------------------------------------------------------------------------

type ErrorFactory = Box<dyn Fn() -> UploadError + Send + Sync>;

#[derive(Default)]
pub struct MockLibrary {
    upload_calls: AtomicUsize,
    create_calls: AtomicUsize,
    created: Mutex<Vec<NewMediaItem>>,
    last_token: Mutex<Option<String>>,
    upload_failure: Mutex<Option<ErrorFactory>>,
    create_failure: Mutex<Option<ErrorFactory>>,
    results: Mutex<Option<Vec<MediaItemResult>>>,
    fail_once: Mutex<Option<String>>,
}

impl MockLibrary {
    pub const UPLOAD_TOKEN: &'static str = "upload-token-1";

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn created_items(&self) -> Vec<NewMediaItem> {
        self.created.lock().unwrap().clone()
    }

    pub fn last_access_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }

    pub fn fail_upload_with(&self, f: impl Fn() -> UploadError + Send + Sync + 'static) {
        *self.upload_failure.lock().unwrap() = Some(Box::new(f));
    }

    pub fn fail_create_with(&self, f: impl Fn() -> UploadError + Send + Sync + 'static) {
        *self.create_failure.lock().unwrap() = Some(Box::new(f));
    }

    pub fn respond_with_status(&self, code: Option<i32>, message: Option<&str>) {
        *self.results.lock().unwrap() = Some(vec![MediaItemResult {
            status: ItemStatus {
                code,
                message: message.map(str::to_string),
            },
            media_item_id: None,
        }]);
    }

    pub fn respond_with_no_results(&self) {
        *self.results.lock().unwrap() = Some(Vec::new());
    }

    /// The next upload of a file with this base name fails with a 500
    pub fn fail_path_once(&self, file_name: &str) {
        *self.fail_once.lock().unwrap() = Some(file_name.to_string());
    }
}

#[async_trait::async_trait]
impl IPhotosLibrary for MockLibrary {
    async fn upload_bytes(
        &self,
        access_token: &str,
        file: &MediaFile,
        progress: Option<ProgressCallback>,
    ) -> Result<UploadToken, UploadError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(access_token.to_string());

        {
            let mut fail_once = self.fail_once.lock().unwrap();
            if fail_once.as_deref() == Some(file.file_name().as_str()) {
                *fail_once = None;
                return Err(UploadError::Transport {
                    status: 500,
                    body: "internal".to_string(),
                });
            }
        }
        if let Some(f) = self.upload_failure.lock().unwrap().as_ref() {
            return Err(f());
        }

        if let Some(progress) = progress {
            progress(file.size / 2, file.size);
            progress(file.size, file.size);
        }
        Ok(UploadToken::new(Self::UPLOAD_TOKEN))
    }

    async fn create_media_item(
        &self,
        _access_token: &str,
        item: &NewMediaItem,
    ) -> Result<Vec<MediaItemResult>, UploadError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(f) = self.create_failure.lock().unwrap().as_ref() {
            return Err(f());
        }
        self.created.lock().unwrap().push(item.clone());

        let results = self.results.lock().unwrap().clone();
        Ok(results.unwrap_or_else(|| {
            vec![MediaItemResult {
                status: ItemStatus {
                    code: Some(0),
                    message: Some("Success".to_string()),
                },
                media_item_id: Some("item-1".to_string()),
            }]
        }))
    }
}

// ---------------------------------------------------------------------------
// MemoryUploadLog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryUploadLog {
    entries: Mutex<Vec<PathBuf>>,
    fail: AtomicBool,
}

impl MemoryUploadLog {
    pub fn seed(&self, path: &str) {
        self.entries.lock().unwrap().push(PathBuf::from(path));
    }

    pub fn entries(&self) -> Vec<PathBuf> {
        self.entries.lock().unwrap().clone()
    }

    pub fn fail_appends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IUploadLog for MemoryUploadLog {
    async fn load(&self) -> anyhow::Result<HashSet<PathBuf>> {
        Ok(self.entries.lock().unwrap().iter().cloned().collect())
    }

    async fn append(&self, path: &Path) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.entries.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ReporterEvent {
    NothingToUpload,
    RunStarted(usize),
    Eta(Duration, usize),
    FileStarted(PathBuf, Option<PathBuf>),
    FileFinished(PathBuf, bool),
    /// attempted, succeeded
    RunFinished(usize, usize),
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReporterEvent>>,
    last_progress: Mutex<Option<(u64, u64)>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ReporterEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn last_progress(&self) -> Option<(u64, u64)> {
        *self.last_progress.lock().unwrap()
    }

    fn push(&self, event: ReporterEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl IMigrationReporter for RecordingReporter {
    fn nothing_to_upload(&self) {
        self.push(ReporterEvent::NothingToUpload);
    }

    fn run_started(&self, total: usize) {
        self.push(ReporterEvent::RunStarted(total));
    }

    fn eta(&self, remaining: Duration, files_left: usize) {
        self.push(ReporterEvent::Eta(remaining, files_left));
    }

    fn file_started(
        &self,
        _index: usize,
        _total: usize,
        path: &Path,
        last_success: Option<&Path>,
    ) {
        self.push(ReporterEvent::FileStarted(
            path.to_path_buf(),
            last_success.map(Path::to_path_buf),
        ));
    }

    fn upload_started(&self, _file: &MediaFile) {}

    fn upload_progress(&self, _file: &MediaFile, sent: u64, total: u64) {
        *self.last_progress.lock().unwrap() = Some((sent, total));
    }

    fn upload_finished(&self, _file: &MediaFile) {}

    fn finalizing(&self, _file: &MediaFile) {}

    fn file_finished(&self, path: &Path, outcome: &Result<MediaFile, UploadError>) {
        self.push(ReporterEvent::FileFinished(path.to_path_buf(), outcome.is_ok()));
    }

    fn run_finished(&self, stats: &RunStats) {
        self.push(ReporterEvent::RunFinished(stats.attempted, stats.succeeded));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub media: Arc<MockMedia>,
    pub library: Arc<MockLibrary>,
    pub log: Arc<MemoryUploadLog>,
    pub reporter: Arc<RecordingReporter>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self {
            media: Arc::new(MockMedia::default()),
            library: Arc::new(MockLibrary::default()),
            log: Arc::new(MemoryUploadLog::default()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn pipeline(&self) -> UploadMediaUseCase {
        UploadMediaUseCase::new(
            Arc::new(StaticCredentials),
            self.library.clone(),
            self.media.clone(),
            self.log.clone(),
            self.reporter.clone(),
        )
    }

    pub fn migrate(&self, throttle: Duration) -> MigrateUseCase {
        MigrateUseCase::new(
            Arc::new(self.pipeline()),
            self.media.clone(),
            self.log.clone(),
            self.reporter.clone(),
            throttle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_log_contains_uses_load() {
        let log = MemoryUploadLog::default();
        log.seed("/media/a.jpg");
        assert!(log.contains(Path::new("/media/a.jpg")).await.unwrap());
        assert!(!log.contains(Path::new("/media/b.jpg")).await.unwrap());
    }
}
