//! Uploaded-log adapter
//!
//! Implements [`IUploadLog`] as a plain text file with one absolute path per
//! line. The file is only ever appended to; each append is flushed to disk
//! before it returns so that a crash right after a successful upload does not
//! cause the file to be uploaded again.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use photolift_core::ports::IUploadLog;
use tracing::{debug, instrument};

/// Append-only uploaded-log stored at a fixed path
#[derive(Debug, Clone)]
pub struct FileUploadLog {
    path: PathBuf,
}

impl FileUploadLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses log contents into a set of paths
///
/// Accepts `\n` and `\r\n` terminators. Lines that are empty or only
/// whitespace are ignored; other lines are taken verbatim.
pub fn parse_log(contents: &[u8]) -> HashSet<PathBuf> {
    contents
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

/// Appends `entry` as one line, starting a new line first if the file does
/// not end with one
fn append_line(log: &Path, entry: &Path) -> std::io::Result<()> {
    if let Some(parent) = log.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(log)?;

    let mut line = Vec::new();
    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            line.push(b'\n');
        }
    }
    line.extend(path_to_bytes(entry));
    line.push(b'\n');

    file.write_all(&line)?;
    file.sync_data()
}

#[async_trait::async_trait]
impl IUploadLog for FileUploadLog {
    #[instrument(skip(self), fields(log = %self.path.display()))]
    async fn load(&self) -> anyhow::Result<HashSet<PathBuf>> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("uploaded-log does not exist yet");
                return Ok(HashSet::new());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read uploaded-log {}", self.path.display()))
            }
        };
        let entries = parse_log(&contents);
        debug!(entries = entries.len(), "uploaded-log loaded");
        Ok(entries)
    }

    #[instrument(skip(self), fields(log = %self.path.display(), entry = %path.display()))]
    async fn append(&self, path: &Path) -> anyhow::Result<()> {
        let log = self.path.clone();
        let entry = path.to_path_buf();
        tokio::task::spawn_blocking(move || append_line(&log, &entry))
            .await
            .context("Uploaded-log writer panicked")?
            .with_context(|| format!("Failed to append to uploaded-log {}", self.path.display()))?;
        debug!("recorded");
        Ok(())
    }
}
