// ─── Managed Java Runtime ───
// Installs the bundled runtime under `java/<runtime-id>/` when no explicit
// Java binary is configured.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::archive;
use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::InstallStage;
use crate::core::launch::SubstitutionMap;
use crate::core::state::{CachePaths, LauncherSettings};
use crate::core::version::Platform;

pub fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Java binary inside an extracted runtime, trying the plain and macOS
/// bundle layouts before searching the tree.
pub fn locate_java_binary(runtime_root: &Path) -> PathBuf {
    let primary = runtime_root.join("bin").join(java_exe());
    if primary.exists() {
        return primary;
    }

    let mac_layout = runtime_root
        .join("Contents")
        .join("Home")
        .join("bin")
        .join(java_exe());
    if mac_layout.exists() {
        return mac_layout;
    }

    find_java_binary_recursive(runtime_root).unwrap_or(primary)
}

fn find_java_binary_recursive(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let file_type = entry.file_type().ok()?;

        if file_type.is_file() {
            if path.file_name().and_then(|n| n.to_str()) == Some(java_exe()) {
                return Some(path);
            }
        } else if file_type.is_dir() {
            if let Some(found) = find_java_binary_recursive(&path) {
                return Some(found);
            }
        }
    }
    None
}

/// Download URL of the runtime archive for this platform.
pub fn runtime_bundle_url(template: &str, runtime_id: &str, platform: &Platform) -> String {
    SubstitutionMap::new()
        .with("runtime", runtime_id)
        .with("os", platform.os_name.as_str())
        .with("bitness", platform.bitness())
        .substitute(template)
}

/// Managed runtime id for a game needing Java `java_major`.
pub fn runtime_id(settings: &LauncherSettings, java_major: u32) -> String {
    settings
        .runtime_id
        .clone()
        .unwrap_or_else(|| format!("jre-{java_major}"))
}

/// Return the Java binary to launch with, installing the managed runtime
/// for `java_major` first if it is missing.
pub async fn ensure_runtime(
    paths: &CachePaths,
    settings: &LauncherSettings,
    platform: &Platform,
    java_major: u32,
    downloader: &Downloader,
) -> LauncherResult<PathBuf> {
    if let Some(java) = &settings.java_executable {
        debug!("Using configured Java binary {:?}", java);
        return Ok(java.clone());
    }

    let runtime_id = runtime_id(settings, java_major);
    let runtime_root = paths.java_dir(&runtime_id);
    let java_bin = locate_java_binary(&runtime_root);
    if java_bin.exists() {
        debug!("Managed runtime present at {:?}", java_bin);
        return Ok(java_bin);
    }

    let Some(template) = settings.runtime_url_template.as_deref() else {
        return Err(LauncherError::BundleUnavailable {
            kind: "runtime",
            path: java_bin,
        });
    };

    let url = runtime_bundle_url(template, &runtime_id, platform);
    let archive_path = runtime_root.with_extension("zip");
    info!("Installing runtime {} from {}", runtime_id, url);

    downloader
        .download_all(InstallStage::Runtime, &[DownloadEntry::new(&url, &archive_path)])
        .await?;

    let extract_from = archive_path.clone();
    let extract_to = runtime_root.clone();
    tokio::task::spawn_blocking(move || archive::extract_zip_file(&extract_from, &extract_to, true))
        .await
        .map_err(|e| LauncherError::Other(format!("Runtime extraction task failed: {e}")))??;

    if let Err(e) = tokio::fs::remove_file(&archive_path).await {
        debug!("Could not remove runtime archive {:?}: {}", archive_path, e);
    }

    let java_bin = locate_java_binary(&runtime_root);
    if !java_bin.exists() {
        return Err(LauncherError::Other(format!(
            "Runtime archive {} has no {} binary",
            url,
            java_exe()
        )));
    }
    ensure_executable(&java_bin)?;

    info!("Runtime ready at {:?}", java_bin);
    Ok(java_bin)
}

fn ensure_executable(java_bin: &Path) -> LauncherResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(java_bin)
            .map_err(|source| LauncherError::Io {
                path: java_bin.to_path_buf(),
                source,
            })?
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(java_bin, perms).map_err(|source| LauncherError::Io {
            path: java_bin.to_path_buf(),
            source,
        })?;
    }
    #[cfg(not(unix))]
    let _ = java_bin;
    Ok(())
}
