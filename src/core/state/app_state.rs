use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::core::downloader::Downloader;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::http::{build_http_client, HttpSource};
use crate::core::launch::ProcessRegistry;

use super::paths::CachePaths;
use super::settings::LauncherSettings;

/// Long-lived launcher state shared by every launch.
pub struct LauncherState {
    pub paths: CachePaths,
    pub settings: LauncherSettings,
    pub source: Arc<dyn HttpSource>,
    pub processes: ProcessRegistry,
}

impl LauncherState {
    /// Open the cache at `root`, reading its settings file.
    pub fn new(root: impl Into<PathBuf>) -> LauncherResult<Self> {
        let paths = CachePaths::new(root);
        let settings = LauncherSettings::load_or_default(&paths.settings_file());
        let client = build_http_client()
            .map_err(|e| LauncherError::Other(format!("Failed to build HTTP client: {e}")))?;

        info!("Launcher cache at {:?}", paths.root());
        Ok(Self::with_source(paths, settings, Arc::new(client)))
    }

    /// Open the cache at the platform default location.
    pub fn open_default() -> LauncherResult<Self> {
        Self::new(CachePaths::default_root())
    }

    pub fn with_source(
        paths: CachePaths,
        settings: LauncherSettings,
        source: Arc<dyn HttpSource>,
    ) -> Self {
        Self {
            paths,
            settings,
            source,
            processes: ProcessRegistry::new(),
        }
    }

    pub fn downloader(&self, events: EventSink) -> Downloader {
        Downloader::new(self.source.clone(), events)
    }

    pub fn save_settings(&self) -> LauncherResult<()> {
        self.settings.save(&self.paths.settings_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::testing::RecordingSource;

    #[test]
    fn settings_round_trip_through_cache_root() {
        let root = std::env::temp_dir().join(format!("state-{}", uuid::Uuid::new_v4()));
        let mut state = LauncherState::with_source(
            CachePaths::new(&root),
            LauncherSettings::default(),
            Arc::new(RecordingSource::new()),
        );
        state.settings.max_memory_mb = 3072;
        state.save_settings().unwrap();

        let reopened = LauncherState::new(&root).unwrap();
        assert_eq!(reopened.settings.max_memory_mb, 3072);
        assert_eq!(reopened.paths.root(), root.as_path());
        let _ = std::fs::remove_dir_all(&root);
    }
}
