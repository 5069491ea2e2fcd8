use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{self, EventSink, InstallStage};
use crate::core::http::HttpSource;

/// A single file to download with optional SHA-1 for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
}

impl DownloadEntry {
    pub fn new(url: &str, dest: &Path) -> Self {
        Self {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            sha1: None,
        }
    }

    pub fn with_sha1(mut self, sha1: Option<&str>) -> Self {
        self.sha1 = sha1.map(str::to_string);
        self
    }

    fn file_name(&self) -> String {
        self.dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Sequential downloader: one request in flight, files land atomically.
#[derive(Clone)]
pub struct Downloader {
    source: Arc<dyn HttpSource>,
    events: EventSink,
}

impl Downloader {
    pub fn new(source: Arc<dyn HttpSource>, events: EventSink) -> Self {
        Self { source, events }
    }

    pub fn source(&self) -> &dyn HttpSource {
        self.source.as_ref()
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Download `entry.url` to `entry.dest`.
    ///
    /// Bytes go to `<dest>.part` first and are renamed into place only after
    /// the optional SHA-1 matched. Any failure removes the partial file.
    pub async fn download_file(&self, entry: &DownloadEntry) -> LauncherResult<()> {
        if let Some(parent) = entry.dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let partial = partial_path(&entry.dest);
        let result = self.fetch_into(entry, &partial).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove partial download {:?}: {}", partial, e);
                }
            }
        }
        result
    }

    async fn fetch_into(&self, entry: &DownloadEntry, partial: &Path) -> LauncherResult<()> {
        let bytes = self.source.get_bytes(&entry.url).await?;

        // Write inside a block so the handle is closed before the rename.
        {
            let mut file =
                tokio::fs::File::create(partial)
                    .await
                    .map_err(|e| LauncherError::Io {
                        path: partial.to_path_buf(),
                        source: e,
                    })?;
            file.write_all(&bytes).await.map_err(|e| LauncherError::Io {
                path: partial.to_path_buf(),
                source: e,
            })?;
            file.flush().await.map_err(|e| LauncherError::Io {
                path: partial.to_path_buf(),
                source: e,
            })?;
        }

        if let Some(expected) = entry.sha1.as_deref() {
            let actual = sha1_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LauncherError::Sha1Mismatch {
                    path: entry.dest.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        tokio::fs::rename(partial, &entry.dest)
            .await
            .map_err(|e| LauncherError::Io {
                path: entry.dest.clone(),
                source: e,
            })?;

        debug!("Downloaded: {} -> {:?}", entry.url, entry.dest);
        Ok(())
    }

    /// Download `entries` strictly in order, reporting progress per file.
    ///
    /// Stops at the first failure; files already completed stay on disk.
    pub async fn download_all(
        &self,
        stage: InstallStage,
        entries: &[DownloadEntry],
    ) -> LauncherResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        info!("Downloading {} files for {:?}", entries.len(), stage);
        for (index, entry) in entries.iter().enumerate() {
            events::progress(&self.events, stage, &entry.file_name(), index, entries.len());
            self.download_file(entry).await?;
        }
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
