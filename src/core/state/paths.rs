use std::path::{Path, PathBuf};

/// Fixed on-disk layout of the shared cache directory.
///
/// ```text
/// <root>/libraries/<group>/<artifact>/<version>/...jar
/// <root>/versions/<id>/<id>.{json,jar}
/// <root>/assets/indexes/<id>.json
/// <root>/assets/objects/<2-hex>/<hash>
/// <root>/java/<runtime-id>/...
/// <root>/natives/<tag><bitness>/...
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<data_dir>/.minecraft`, or `./.minecraft` when no data dir is known.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn version_json(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.json"))
    }

    pub fn version_jar(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{id}.jar"))
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_index(&self, id: &str) -> PathBuf {
        self.assets_dir().join("indexes").join(format!("{id}.json"))
    }

    pub fn asset_objects_dir(&self) -> PathBuf {
        self.assets_dir().join("objects")
    }

    pub fn java_dir(&self, runtime_id: &str) -> PathBuf {
        self.root.join("java").join(runtime_id)
    }

    pub fn natives_dir(&self, tag: &str, bitness: &str) -> PathBuf {
        self.root.join("natives").join(format!("{tag}{bitness}"))
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("launcher_settings.json")
    }

    pub fn install_lock(&self) -> PathBuf {
        self.root.join("install.lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_cache_convention() {
        let paths = CachePaths::new("/mc");
        assert_eq!(paths.version_json("1.8.9"), PathBuf::from("/mc/versions/1.8.9/1.8.9.json"));
        assert_eq!(paths.version_jar("1.8.9"), PathBuf::from("/mc/versions/1.8.9/1.8.9.jar"));
        assert_eq!(paths.asset_index("1.8"), PathBuf::from("/mc/assets/indexes/1.8.json"));
        assert_eq!(paths.java_dir("jre-17"), PathBuf::from("/mc/java/jre-17"));
        assert_eq!(paths.natives_dir("3old", "arm32"), PathBuf::from("/mc/natives/3oldarm32"));
    }
}
