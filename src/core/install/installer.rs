// ─── Dependency Installer ───
// Five passes over a resolved descriptor: runtime, libraries, natives,
// assets, client jar. Every pass checks the cache before touching the
// network, so a complete cache costs no requests.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::archive;
use crate::core::assets::AssetManager;
use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::InstallStage;
use crate::core::java;
use crate::core::launch::LaunchContext;
use crate::core::maven::create_download;
use crate::core::version::VersionJson;

use super::lock::InstallLock;
use super::natives;

/// Local files a launch needs, produced by a full install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledVersion {
    pub version_id: String,
    pub java: PathBuf,
    /// Non-native library jars in descriptor order.
    pub classpath: Vec<PathBuf>,
    /// Native classifier jars in descriptor order.
    pub native_jars: Vec<PathBuf>,
    pub natives_dir: PathBuf,
    pub version_jar: PathBuf,
}

pub struct Installer<'a> {
    ctx: &'a LaunchContext,
    downloader: Downloader,
}

impl<'a> Installer<'a> {
    pub fn new(ctx: &'a LaunchContext, downloader: Downloader) -> Self {
        Self { ctx, downloader }
    }

    /// Install everything `version` (already resolved) needs.
    pub async fn install(&self, version: &VersionJson) -> LauncherResult<InstalledVersion> {
        let _lock = InstallLock::acquire(&self.ctx.paths.install_lock()).await?;
        info!("Installing version {}", version.id);

        let java = java::ensure_runtime(
            &self.ctx.paths,
            &self.ctx.settings,
            &self.ctx.platform,
            version.required_java_major(),
            &self.downloader,
        )
        .await?;

        let (classpath, native_jars) = self.install_libraries(version).await?;
        let natives_dir = self.install_natives(version, &native_jars).await?;
        self.install_assets(version).await?;
        let version_jar = self.install_client_jar(version).await?;

        info!("Version {} installed", version.id);
        Ok(InstalledVersion {
            version_id: version.id.clone(),
            java,
            classpath,
            native_jars,
            natives_dir,
            version_jar,
        })
    }

    async fn install_libraries(
        &self,
        version: &VersionJson,
    ) -> LauncherResult<(Vec<PathBuf>, Vec<PathBuf>)> {
        let env = self.ctx.rule_env();
        let libraries_dir = self.ctx.paths.libraries_dir();

        let mut queued: Vec<DownloadEntry> = Vec::new();
        let mut classpath = Vec::new();
        let mut native_jars = Vec::new();

        for library in &version.libraries {
            if !library.is_allowed(&env) {
                debug!("Skipping library {} (rules)", library.name);
                continue;
            }

            let (artifact, from_natives_map) = library.artifact_for(&self.ctx.platform)?;
            if library.natives.is_some() && !from_natives_map {
                debug!("Skipping library {} (no natives for {})", library.name, self.ctx.platform.os_name);
                continue;
            }
            let local_path = libraries_dir.join(library.relative_path(&artifact));
            let source = library.source(&artifact);

            if let Some(entry) = create_download(&source.url, &local_path) {
                queued.push(entry.with_sha1(source.sha1.as_deref()));
            }

            if from_natives_map {
                native_jars.push(local_path);
            } else {
                classpath.push(local_path);
            }
        }

        info!(
            "Libraries: {} on classpath, {} native, {} missing",
            classpath.len(),
            native_jars.len(),
            queued.len()
        );
        self.downloader
            .download_all(InstallStage::Libraries, &queued)
            .await?;

        Ok((classpath, native_jars))
    }

    async fn install_natives(
        &self,
        version: &VersionJson,
        native_jars: &[PathBuf],
    ) -> LauncherResult<PathBuf> {
        let natives_dir = natives::install_natives_bundle(
            &self.ctx.paths,
            &self.ctx.settings,
            &self.ctx.platform,
            version.game_version(),
            &self.downloader,
        )
        .await?;

        if native_jars.is_empty() {
            return Ok(natives_dir);
        }

        let jars = native_jars.to_vec();
        let target = natives_dir.clone();
        let extracted = tokio::task::spawn_blocking(move || -> LauncherResult<usize> {
            let mut total = 0;
            for jar in &jars {
                total += archive::extract_native_libraries(jar, &target)?;
            }
            Ok(total)
        })
        .await
        .map_err(|e| LauncherError::Other(format!("Native extraction task failed: {e}")))??;

        debug!("Extracted {} native libraries into {:?}", extracted, natives_dir);
        Ok(natives_dir)
    }

    async fn install_assets(&self, version: &VersionJson) -> LauncherResult<()> {
        match &version.asset_index {
            Some(info) => {
                AssetManager::install(info, &self.ctx.paths, &self.downloader).await?;
            }
            None => warn!("Version {} declares no asset index", version.id),
        }
        Ok(())
    }

    async fn install_client_jar(&self, version: &VersionJson) -> LauncherResult<PathBuf> {
        let jar_id = version.jar.as_deref().unwrap_or(&version.id);
        let version_jar = self.ctx.paths.version_jar(jar_id);

        if version_jar.exists() {
            debug!("Client jar present at {:?}", version_jar);
            return Ok(version_jar);
        }

        let download = version.client_download().ok_or_else(|| {
            LauncherError::Other(format!("Version {} declares no client jar", version.id))
        })?;

        if let Some(entry) = create_download(&download.url, &version_jar) {
            self.downloader
                .download_all(
                    InstallStage::ClientJar,
                    &[entry.with_sha1(download.sha1.as_deref())],
                )
                .await?;
        }
        Ok(version_jar)
    }
}
