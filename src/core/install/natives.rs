// ─── Natives Bundle ───
// Rendering-library natives are shared per version family, selected by a
// tag derived from the game's minor version.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::archive;
use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::InstallStage;
use crate::core::launch::SubstitutionMap;
use crate::core::state::{CachePaths, LauncherSettings};
use crate::core::version::{minor_version, Platform};

/// Native tag for a game version id.
///
/// Minor < 13 → `2`, 13..=18 → `3old`, 19 and later → `3`. Ids without a
/// numeric minor part (snapshots such as `23w14a`) use `3`.
pub fn native_tag(game_version: &str) -> &'static str {
    let Some(minor) = minor_version(game_version) else {
        return "3";
    };

    match minor {
        0..=12 => "2",
        13..=18 => "3old",
        _ => "3",
    }
}

pub fn natives_bundle_url(template: &str, tag: &str, platform: &Platform) -> String {
    SubstitutionMap::new()
        .with("tag", tag)
        .with("os", platform.os_name.as_str())
        .with("bitness", platform.bitness())
        .substitute(template)
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Make sure `natives/<tag><bitness>/` is populated and return it.
///
/// Without a configured bundle source the directory is only created; the
/// native classifier jars then provide its contents.
pub async fn install_natives_bundle(
    paths: &CachePaths,
    settings: &LauncherSettings,
    platform: &Platform,
    game_version: &str,
    downloader: &Downloader,
) -> LauncherResult<PathBuf> {
    let tag = native_tag(game_version);
    let bitness = platform.bitness();
    let natives_dir = paths.natives_dir(tag, &bitness);

    if has_entries(&natives_dir) {
        debug!("Natives bundle {}{} present", tag, bitness);
        return Ok(natives_dir);
    }

    let Some(template) = settings.natives_url_template.as_deref() else {
        debug!("No natives bundle source configured, using classifier jars only");
        tokio::fs::create_dir_all(&natives_dir)
            .await
            .map_err(|source| LauncherError::Io {
                path: natives_dir.clone(),
                source,
            })?;
        return Ok(natives_dir);
    };

    let url = natives_bundle_url(template, tag, platform);
    let archive_path = paths.root().join("natives").join(format!("{tag}{bitness}.zip"));
    info!("Installing natives bundle {}{} from {}", tag, bitness, url);

    downloader
        .download_all(InstallStage::Natives, &[DownloadEntry::new(&url, &archive_path)])
        .await?;

    let extract_from = archive_path.clone();
    let extract_to = natives_dir.clone();
    tokio::task::spawn_blocking(move || archive::extract_zip_file(&extract_from, &extract_to, false))
        .await
        .map_err(|e| LauncherError::Other(format!("Natives extraction task failed: {e}")))??;

    if let Err(e) = tokio::fs::remove_file(&archive_path).await {
        debug!("Could not remove natives archive {:?}: {}", archive_path, e);
    }

    Ok(natives_dir)
}
