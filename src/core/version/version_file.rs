// ─── Version File ───
// Typed model of a version descriptor (`versions/<id>/<id>.json`).

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::{MavenArtifact, MOJANG_LIBRARIES};

use super::rules::{self, Platform, Rule, RuleEnv};

/// A parsed version descriptor. After resolution it carries no parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub version_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// Legacy single-string game arguments (pre-1.13).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<VersionDownloads>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_launcher_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_version: Option<JavaVersionInfo>,

    /// Ids of the flattened parents, nearest first. Filled by the resolver.
    #[serde(skip)]
    pub lineage: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersionInfo {
    #[serde(default)]
    pub component: Option<String>,
    pub major_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub client: Option<DownloadArtifact>,
    #[serde(default)]
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

/// Modern argument lists keyed by phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<ArgumentToken>,
    #[serde(default)]
    pub jvm: Vec<ArgumentToken>,
}

/// One entry of `arguments.game` / `arguments.jvm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentToken {
    Plain(String),
    Conditional {
        #[serde(default, alias = "compatibilityRules")]
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    One(String),
    Many(Vec<String>),
}

impl ArgumentToken {
    /// Values emitted by this token when its rules apply, otherwise none.
    pub fn values(&self, env: &RuleEnv<'_>) -> Vec<&str> {
        match self {
            ArgumentToken::Plain(value) => vec![value.as_str()],
            ArgumentToken::Conditional { rules, value } => {
                if !rules::applies(rules, env) {
                    return Vec::new();
                }
                match value {
                    ArgumentValue::One(v) => vec![v.as_str()],
                    ArgumentValue::Many(vs) => vs.iter().map(String::as_str).collect(),
                }
            }
        }
    }
}

// ─── Library Entry with Rules ───

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Maven coordinate `group:artifact:version`.
    pub name: String,
    /// Repository base for libraries without explicit downloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// OS name → native classifier (may contain `${arch}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natives: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
    #[serde(default)]
    pub classifiers: Option<BTreeMap<String, LibDownloadArtifact>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibDownloadArtifact {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

/// Where a library file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySource {
    pub url: String,
    pub sha1: Option<String>,
}

impl LibraryEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: None,
            downloads: None,
            rules: Vec::new(),
            natives: None,
        }
    }

    pub fn is_allowed(&self, env: &RuleEnv<'_>) -> bool {
        rules::applies(&self.rules, env)
    }

    /// Native classifier declared for `platform`, with `${arch}` replaced.
    pub fn native_classifier(&self, platform: &Platform) -> Option<String> {
        self.natives
            .as_ref()?
            .get(&platform.os_name)
            .map(|classifier| classifier.replace("${arch}", platform.pointer_width))
    }

    /// The artifact to install on `platform` and whether it came from the
    /// `natives` map. A classifier written into the coordinate itself
    /// (`group:artifact:version:natives-linux`) is kept as is.
    pub fn artifact_for(&self, platform: &Platform) -> LauncherResult<(MavenArtifact, bool)> {
        let parsed = MavenArtifact::parse(&self.name)?;
        Ok(match self.native_classifier(platform) {
            Some(classifier) => (parsed.with_classifier(Some(&classifier)), true),
            None => (parsed, false),
        })
    }

    /// `downloads` entry describing `artifact`, if the descriptor lists one.
    fn explicit_download(&self, artifact: &MavenArtifact) -> Option<&LibDownloadArtifact> {
        let downloads = self.downloads.as_ref()?;
        let from_classifiers = artifact
            .classifier
            .as_ref()
            .and_then(|classifier| downloads.classifiers.as_ref()?.get(classifier));

        from_classifiers.or_else(|| {
            let declared = MavenArtifact::parse(&self.name).ok()?;
            if declared.classifier == artifact.classifier {
                downloads.artifact.as_ref()
            } else {
                None
            }
        })
    }

    /// Download URL for this library (or one of its classifiers).
    ///
    /// A classifier taken from the `classifiers` map wins; the coordinate's
    /// own artifact uses `downloads.artifact`; anything else falls back to
    /// the Maven layout under the library's repository.
    pub fn source(&self, artifact: &MavenArtifact) -> LibrarySource {
        match self.explicit_download(artifact) {
            Some(found) => LibrarySource {
                url: found.url.clone(),
                sha1: found.sha1.clone(),
            },
            None => LibrarySource {
                url: artifact.url(self.url.as_deref().unwrap_or(MOJANG_LIBRARIES)),
                sha1: None,
            },
        }
    }

    /// Path of `artifact` relative to the libraries directory.
    ///
    /// A `path` from the descriptor is used when it stays inside the
    /// libraries directory, otherwise the Maven layout.
    pub fn relative_path(&self, artifact: &MavenArtifact) -> PathBuf {
        self.explicit_download(artifact)
            .and_then(|found| found.path.as_deref())
            .map(Path::new)
            .filter(|path| is_contained(path))
            .map(Path::to_path_buf)
            .unwrap_or_else(|| artifact.local_path())
    }
}

/// Numeric minor part of a release id (`1.12.2` → 12). Snapshot ids have none.
pub fn minor_version(id: &str) -> Option<u32> {
    let part = id.split('.').nth(1)?;
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

impl VersionJson {
    /// Parse descriptor bytes read from `origin`.
    pub fn from_slice(bytes: &[u8], origin: &Path) -> LauncherResult<Self> {
        serde_json::from_slice(bytes).map_err(|source| LauncherError::MalformedDescriptor {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a descriptor from disk.
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| LauncherError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_slice(&bytes, path)
    }

    /// Version id of the game itself: the root of the inheritance chain.
    pub fn game_version(&self) -> &str {
        self.lineage.last().map(String::as_str).unwrap_or(&self.id)
    }

    /// Asset index id, preferring `assetIndex.id` over `assets`.
    pub fn asset_index_id(&self) -> Option<&str> {
        self.asset_index
            .as_ref()
            .map(|ai| ai.id.as_str())
            .or(self.assets.as_deref())
    }

    pub fn client_download(&self) -> Option<&DownloadArtifact> {
        self.downloads.as_ref()?.client.as_ref()
    }

    /// Java major version the game needs: `javaVersion` when declared,
    /// otherwise 16 from 1.17 on and 8 before that.
    pub fn required_java_major(&self) -> u32 {
        if let Some(java) = &self.java_version {
            return java.major_version;
        }
        match minor_version(self.game_version()) {
            Some(minor) if minor >= 17 => 16,
            _ => 8,
        }
    }

    pub fn main_class(&self) -> LauncherResult<&str> {
        self.main_class
            .as_deref()
            .ok_or_else(|| LauncherError::Other(format!("Version {} has no main class", self.id)))
    }
}
