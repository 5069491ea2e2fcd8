use std::path::PathBuf;

use indexmap::IndexMap;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::core::downloader::{DownloadEntry, Downloader};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::InstallStage;
use crate::core::maven::create_download;
use crate::core::state::CachePaths;
use crate::core::version::AssetIndexInfo;

pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Top-level asset index JSON structure, in file order.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: IndexMap<String, AssetObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetObject {
    /// Lowercase hex SHA-1; it names the object file, so nothing else is accepted.
    #[serde(deserialize_with = "sha1_hash")]
    pub hash: String,
    pub size: u64,
}

fn sha1_hash<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let hash = String::deserialize(deserializer)?;
    let valid = hash.len() == 40 && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if valid {
        Ok(hash)
    } else {
        Err(de::Error::invalid_value(
            Unexpected::Str(&hash),
            &"a 40 character lowercase hex SHA-1",
        ))
    }
}

impl AssetObject {
    /// First two hex characters of the hash.
    pub fn prefix(&self) -> &str {
        self.hash.get(..2).unwrap_or(&self.hash)
    }

    /// `objects/<first-2-hex>/<hash>`, relative to the assets directory.
    pub fn object_path(&self) -> PathBuf {
        PathBuf::from("objects").join(self.prefix()).join(&self.hash)
    }

    pub fn url(&self) -> String {
        format!("{}/{}/{}", RESOURCES_URL, self.prefix(), self.hash)
    }
}

/// Installs the asset index and every object it references.
pub struct AssetManager;

impl AssetManager {
    /// Fetch the index if it is not cached, then download the missing
    /// objects in index order. Returns the number of objects fetched.
    pub async fn install(
        info: &AssetIndexInfo,
        paths: &CachePaths,
        downloader: &Downloader,
    ) -> LauncherResult<usize> {
        let index_path = paths.asset_index(&info.id);
        if let Some(entry) = create_download(&info.url, &index_path) {
            info!("Downloading asset index {}", info.id);
            downloader
                .download_file(&entry.with_sha1(info.sha1.as_deref()))
                .await?;
        }

        let raw = tokio::fs::read(&index_path)
            .await
            .map_err(|source| LauncherError::Io {
                path: index_path.clone(),
                source,
            })?;
        let index: AssetIndex =
            serde_json::from_slice(&raw).map_err(|source| LauncherError::MalformedDescriptor {
                path: index_path.clone(),
                source,
            })?;

        let assets_dir = paths.assets_dir();
        let queued: Vec<DownloadEntry> = index
            .objects
            .values()
            .filter_map(|object| {
                create_download(&object.url(), &assets_dir.join(object.object_path()))
                    .map(|entry| entry.with_sha1(Some(&object.hash)))
            })
            .collect();

        info!(
            "Asset index {}: {} objects, {} missing",
            info.id,
            index.objects.len(),
            queued.len()
        );

        downloader.download_all(InstallStage::Assets, &queued).await?;
        Ok(queued.len())
    }
}
