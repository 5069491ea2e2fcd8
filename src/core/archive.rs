// ─── Archive Extraction ───
// Unpacks zip bundles (runtime, natives) and native-classifier jars.

use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

/// Extract every entry of the zip at `zip_path` below `dest`.
///
/// With `strip_root` the first path component of each entry is dropped,
/// which flattens archives that wrap everything in one top directory.
pub fn extract_zip_file(zip_path: &Path, dest: &Path, strip_root: bool) -> LauncherResult<()> {
    let zip_file = std::fs::File::open(zip_path).map_err(|source| LauncherError::Io {
        path: zip_path.to_path_buf(),
        source,
    })?;
    extract_zip(zip_file, dest, strip_root)
}

pub fn extract_zip<R: Read + Seek>(reader: R, dest: &Path, strip_root: bool) -> LauncherResult<()> {
    let mut archive = zip::ZipArchive::new(reader)?;

    create_dir(dest)?;

    for index in 0..archive.len() {
        let mut zipped = archive.by_index(index)?;

        let enclosed_name = zipped
            .enclosed_name()
            .ok_or_else(|| LauncherError::Other(format!("Invalid zip entry path: {}", zipped.name())))?;
        let mut components = enclosed_name.components();
        if strip_root {
            let _ = components.next();
        }

        let mut rel_path = PathBuf::new();
        for component in components {
            if let Component::Normal(part) = component {
                rel_path.push(part);
            }
        }

        if rel_path.as_os_str().is_empty() {
            continue;
        }

        let out_path = dest.join(rel_path);
        if zipped.is_dir() {
            create_dir(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            create_dir(parent)?;
        }

        let mut out = std::fs::File::create(&out_path).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;
        std::io::copy(&mut zipped, &mut out).map_err(|source| LauncherError::Io {
            path: out_path.clone(),
            source,
        })?;

        #[cfg(unix)]
        if let Some(mode) = zipped.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode));
        }
    }

    Ok(())
}

fn is_native_library(name: &str) -> bool {
    name.ends_with(".so")
        || name.ends_with(".dll")
        || name.ends_with(".dylib")
        || name.ends_with(".jnilib")
}

/// Copy the top-level shared libraries of a native-classifier jar into
/// `natives_dir`. Files that already exist are left alone.
///
/// Returns the number of files written.
pub fn extract_native_libraries(jar_path: &Path, natives_dir: &Path) -> LauncherResult<usize> {
    let jar = std::fs::File::open(jar_path).map_err(|source| LauncherError::Io {
        path: jar_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(jar)?;
    create_dir(natives_dir)?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let name = file.name().to_string();

        if name.starts_with("META-INF") || name.contains('/') || name.contains('\\') {
            continue;
        }
        if !is_native_library(&name) {
            continue;
        }

        let dest = natives_dir.join(&name);
        if dest.exists() {
            continue;
        }

        let mut out = std::fs::File::create(&dest).map_err(|source| LauncherError::Io {
            path: dest.clone(),
            source,
        })?;
        std::io::copy(&mut file, &mut out).map_err(|source| LauncherError::Io {
            path: dest.clone(),
            source,
        })?;
        debug!("Extracted native: {}", name);
        written += 1;
    }

    Ok(written)
}

fn create_dir(path: &Path) -> LauncherResult<()> {
    std::fs::create_dir_all(path).map_err(|source| LauncherError::Io {
        path: path.to_path_buf(),
        source,
    })
}
