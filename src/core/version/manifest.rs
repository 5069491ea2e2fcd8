// ─── Version Manifest ───
// Handles fetching and parsing the remote version manifest.

use serde::Deserialize;
use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::HttpSource;

pub const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// Top-level version manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: Option<LatestVersions>,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    #[serde(default)]
    pub release_time: Option<String>,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl VersionManifest {
    pub async fn fetch(source: &dyn HttpSource, url: &str) -> LauncherResult<Self> {
        info!("Fetching version manifest from {}", url);

        let raw = source.get_bytes(url).await?;
        let manifest: VersionManifest =
            serde_json::from_slice(&raw).map_err(|source| LauncherError::MalformedDescriptor {
                path: url.into(),
                source,
            })?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// List all stable releases.
    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| v.version_type == "release")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::testing::RecordingSource;

    const MANIFEST: &str = r#"{
        "latest": {"release": "1.20.4", "snapshot": "24w01a"},
        "versions": [
            {"id": "24w01a", "type": "snapshot", "url": "https://example.com/24w01a.json"},
            {"id": "1.20.4", "type": "release", "releaseTime": "2023-12-07T12:56:20+00:00",
             "url": "https://example.com/1.20.4.json", "sha1": "abc123"}
        ]
    }"#;

    #[tokio::test]
    async fn fetch_and_lookup() {
        let source = RecordingSource::new().with("https://meta/manifest.json", MANIFEST);
        let manifest = VersionManifest::fetch(&source, "https://meta/manifest.json")
            .await
            .unwrap();

        let entry = manifest.find_version("1.20.4").unwrap();
        assert_eq!(entry.url, "https://example.com/1.20.4.json");
        assert_eq!(entry.sha1.as_deref(), Some("abc123"));
        assert!(manifest.find_version("1.0").is_none());
        assert_eq!(manifest.releases().len(), 1);
        assert_eq!(manifest.latest.unwrap().snapshot, "24w01a");
    }

    #[tokio::test]
    async fn garbage_manifest_is_malformed() {
        let source = RecordingSource::new().with("https://meta/bad.json", "[]");
        let err = VersionManifest::fetch(&source, "https://meta/bad.json")
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::MalformedDescriptor { .. }));
    }
}
