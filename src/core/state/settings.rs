use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

/// Operator-tunable launcher settings, stored as `launcher_settings.json`
/// in the cache root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Use this Java binary and skip the managed runtime pass.
    pub java_executable: Option<PathBuf>,
    /// Pin the managed runtime under `java/` to this id. When unset the id
    /// is `jre-<major>` for the Java major the version requires.
    pub runtime_id: Option<String>,
    /// Zip archive of the managed runtime.
    /// Placeholders: `${runtime}`, `${os}`, `${bitness}`.
    pub runtime_url_template: Option<String>,
    /// Zip archive of the native rendering libraries.
    /// Placeholders: `${tag}`, `${os}`, `${bitness}`.
    pub natives_url_template: Option<String>,
    pub version_manifest_url: String,
    pub max_memory_mb: u32,
    pub launcher_name: String,
    pub launcher_version: String,
    pub language: String,
    /// Value exported as `MESA_GL_VERSION_OVERRIDE` to the game.
    pub graphics_override: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            java_executable: None,
            runtime_id: None,
            runtime_url_template: None,
            natives_url_template: None,
            version_manifest_url: crate::core::version::VERSION_MANIFEST_URL.into(),
            max_memory_mb: 1024,
            launcher_name: "pilauncher".into(),
            launcher_version: env!("CARGO_PKG_VERSION").into(),
            language: "en_us".into(),
            graphics_override: "4.5".into(),
        }
    }
}

impl LauncherSettings {
    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Ignoring unreadable settings file {:?}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> LauncherResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| LauncherError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("settings-missing-{}.json", uuid::Uuid::new_v4()));
        assert_eq!(LauncherSettings::load_or_default(&path), LauncherSettings::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = std::env::temp_dir().join(format!("settings-partial-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("launcher_settings.json");
        std::fs::write(&path, r#"{"max_memory_mb": 2048, "runtime_id": "jre-8"}"#).unwrap();

        let settings = LauncherSettings::load_or_default(&path);
        assert_eq!(settings.max_memory_mb, 2048);
        assert_eq!(settings.runtime_id.as_deref(), Some("jre-8"));
        assert_eq!(settings.graphics_override, "4.5");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("settings-save-{}", uuid::Uuid::new_v4()));
        let path = dir.join("launcher_settings.json");
        let settings = LauncherSettings {
            java_executable: Some(PathBuf::from("/opt/jdk/bin/java")),
            ..LauncherSettings::default()
        };

        settings.save(&path).unwrap();
        assert_eq!(LauncherSettings::load_or_default(&path), settings);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
