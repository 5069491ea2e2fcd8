// ─── Classpath Builder ───
// Joins the resolved library jars and the version jar into `-cp` form.

use std::path::{Path, PathBuf};

use tracing::debug;

pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Every non-native library in resolution order, then the version jar.
///
/// Duplicate entries are kept as they appear in the merged descriptor.
pub fn build_classpath(libraries: &[PathBuf], version_jar: &Path, separator: &str) -> String {
    let entries: Vec<String> = libraries
        .iter()
        .map(|path| safe_path_str(path))
        .chain(std::iter::once(safe_path_str(version_jar)))
        .collect();

    debug!("Classpath: {} entries", entries.len());
    entries.join(separator)
}

/// Path text suitable for a JVM argument.
pub fn safe_path_str(path: &Path) -> String {
    let text = path.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        // The JVM rejects extended-length prefixes on classpath entries.
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn libraries_then_version_jar() {
        let libraries = vec![PathBuf::from("/lib/a.jar"), PathBuf::from("/lib/b.jar")];
        let classpath = build_classpath(&libraries, Path::new("/versions/v/v.jar"), ":");
        assert_eq!(classpath, "/lib/a.jar:/lib/b.jar:/versions/v/v.jar");
    }

    #[test]
    fn duplicates_are_preserved() {
        let libraries = vec![PathBuf::from("/lib/a.jar"), PathBuf::from("/lib/a.jar")];
        let classpath = build_classpath(&libraries, Path::new("/v.jar"), ";");
        assert_eq!(classpath, "/lib/a.jar;/lib/a.jar;/v.jar");
    }

    #[test]
    fn version_jar_alone() {
        assert_eq!(build_classpath(&[], Path::new("/v.jar"), ":"), "/v.jar");
    }
}
