// ─── Version Resolver ───
// Loads version descriptors and flattens their `inheritsFrom` chain.

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::HttpSource;
use crate::core::state::CachePaths;

use super::manifest::{VersionManifest, VERSION_MANIFEST_URL};
use super::version_file::{Arguments, VersionJson};

pub struct VersionResolver<'a> {
    paths: &'a CachePaths,
    source: &'a dyn HttpSource,
    manifest_url: String,
    manifest: Option<VersionManifest>,
}

impl<'a> VersionResolver<'a> {
    pub fn new(paths: &'a CachePaths, source: &'a dyn HttpSource) -> Self {
        Self {
            paths,
            source,
            manifest_url: VERSION_MANIFEST_URL.to_string(),
            manifest: None,
        }
    }

    pub fn with_manifest_url(mut self, url: &str) -> Self {
        self.manifest_url = url.to_string();
        self
    }

    /// Use an already fetched manifest instead of downloading one.
    pub fn with_manifest(mut self, manifest: VersionManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    async fn manifest(&mut self) -> LauncherResult<&VersionManifest> {
        if self.manifest.is_none() {
            let fetched = VersionManifest::fetch(self.source, &self.manifest_url).await?;
            self.manifest = Some(fetched);
        }
        self.manifest
            .as_ref()
            .ok_or_else(|| LauncherError::Other("version manifest unavailable".into()))
    }

    /// Load the descriptor for `id` from the cache, or fetch and cache it.
    pub async fn load(&mut self, id: &str) -> LauncherResult<VersionJson> {
        let local = self.paths.version_json(id);
        if local.exists() {
            debug!("Using cached descriptor {:?}", local);
            return VersionJson::load(&local).await;
        }

        let url = self
            .manifest()
            .await?
            .find_version(id)
            .map(|entry| entry.url.clone())
            .ok_or_else(|| LauncherError::MissingManifestEntry(id.to_string()))?;

        info!("Fetching descriptor for {} from {}", id, url);
        let raw = self.source.get_bytes(&url).await?;
        let descriptor = VersionJson::from_slice(&raw, &local)?;

        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&local, &raw)
            .await
            .map_err(|source| LauncherError::Io {
                path: local.clone(),
                source,
            })?;

        Ok(descriptor)
    }

    /// Flatten `descriptor` with all of its parents.
    ///
    /// A descriptor without `inheritsFrom` is returned unchanged. Revisiting
    /// an id (including a version inheriting from itself) is rejected.
    pub async fn resolve(&mut self, descriptor: VersionJson) -> LauncherResult<VersionJson> {
        if descriptor.inherits_from.is_none() {
            return Ok(descriptor);
        }

        let mut seen = vec![descriptor.id.clone()];
        let mut pending = Vec::new();
        let mut current = descriptor;

        while let Some(parent_id) = current.inherits_from.clone() {
            if seen.contains(&parent_id) {
                seen.push(parent_id);
                return Err(LauncherError::CyclicInheritance { chain: seen });
            }

            let parent = self.load(&parent_id).await.map_err(|err| match err {
                LauncherError::MissingManifestEntry(_) => LauncherError::MissingParentVersion {
                    child: current.id.clone(),
                    parent: parent_id.clone(),
                },
                other => other,
            })?;

            seen.push(parent_id);
            pending.push(current);
            current = parent;
        }

        let mut resolved = current;
        while let Some(child) = pending.pop() {
            resolved = merge(child, resolved);
        }

        info!("Resolved {} through {}", resolved.id, seen.join(" -> "));
        Ok(resolved)
    }

    pub async fn resolve_id(&mut self, id: &str) -> LauncherResult<VersionJson> {
        let descriptor = self.load(id).await?;
        self.resolve(descriptor).await
    }
}

/// Overlay `child` onto an already resolved `parent`.
///
/// Identity fields come from the child, scalar fields fall through to the
/// parent when the child lacks them, and lists concatenate child-first.
/// Libraries are NOT de-duplicated by coordinate.
pub fn merge(child: VersionJson, parent: VersionJson) -> VersionJson {
    let mut lineage = Vec::with_capacity(parent.lineage.len() + 1);
    lineage.push(parent.id.clone());
    lineage.extend(parent.lineage);

    let mut libraries = child.libraries;
    libraries.extend(parent.libraries);

    let arguments = match (child.arguments, parent.arguments) {
        (None, None) => None,
        (Some(own), None) => Some(own),
        (None, Some(inherited)) => Some(inherited),
        (Some(own), Some(inherited)) => {
            let mut game = own.game;
            game.extend(inherited.game);
            let mut jvm = own.jvm;
            jvm.extend(inherited.jvm);
            Some(Arguments { game, jvm })
        }
    };

    VersionJson {
        id: child.id,
        inherits_from: None,
        version_type: child.version_type,
        time: child.time,
        release_time: child.release_time,
        main_class: child.main_class.or(parent.main_class),
        minecraft_arguments: child.minecraft_arguments.or(parent.minecraft_arguments),
        arguments,
        libraries,
        asset_index: child.asset_index.or(parent.asset_index),
        assets: child.assets.or(parent.assets),
        downloads: child.downloads.or(parent.downloads),
        minimum_launcher_version: child
            .minimum_launcher_version
            .or(parent.minimum_launcher_version),
        jar: child.jar.or(parent.jar),
        java_version: child.java_version.or(parent.java_version),
        lineage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::testing::RecordingSource;
    use crate::core::version::ArgumentToken;

    fn descriptor(value: serde_json::Value) -> VersionJson {
        serde_json::from_value(value).unwrap()
    }

    fn scratch() -> CachePaths {
        let root = std::env::temp_dir().join(format!("resolver-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).unwrap();
        CachePaths::new(root)
    }

    fn write_local(paths: &CachePaths, value: &serde_json::Value) {
        let id = value["id"].as_str().unwrap();
        let path = paths.version_json(id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec(value).unwrap()).unwrap();
    }

    fn library_names(version: &VersionJson) -> Vec<&str> {
        version.libraries.iter().map(|l| l.name.as_str()).collect()
    }

    #[tokio::test]
    async fn resolve_without_parent_is_identity() {
        let paths = scratch();
        let source = RecordingSource::new();
        let mut resolver = VersionResolver::new(&paths, &source);

        let original = descriptor(serde_json::json!({
            "id": "1.12.2",
            "mainClass": "net.minecraft.client.main.Main",
            "minecraftArguments": "--username ${auth_player_name}",
            "libraries": [{"name": "a:b:1"}, {"name": "a:b:1"}]
        }));

        let resolved = resolver.resolve(original.clone()).await.unwrap();
        assert_eq!(resolved, original);
        assert_eq!(source.request_count(), 0);
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[tokio::test]
    async fn two_level_chain_concatenates_libraries_without_dedup() {
        let paths = scratch();
        write_local(
            &paths,
            &serde_json::json!({
                "id": "1.19.2",
                "type": "release",
                "mainClass": "net.minecraft.client.main.Main",
                "assets": "1.19",
                "arguments": {"game": ["--parent"], "jvm": ["-Dparent"]},
                "libraries": [{"name": "p:one:1"}, {"name": "shared:lib:1"}],
                "downloads": {"client": {"url": "https://example.com/client.jar"}}
            }),
        );

        let source = RecordingSource::new();
        let mut resolver = VersionResolver::new(&paths, &source);
        let child = descriptor(serde_json::json!({
            "id": "fabric-1.19.2",
            "inheritsFrom": "1.19.2",
            "type": "modded",
            "mainClass": "net.fabricmc.loader.impl.launch.knot.KnotClient",
            "arguments": {"game": ["--child"]},
            "libraries": [{"name": "c:one:1"}, {"name": "shared:lib:1"}]
        }));

        let resolved = resolver.resolve(child).await.unwrap();

        assert_eq!(resolved.id, "fabric-1.19.2");
        assert_eq!(resolved.version_type.as_deref(), Some("modded"));
        assert_eq!(resolved.inherits_from, None);
        assert_eq!(
            resolved.main_class.as_deref(),
            Some("net.fabricmc.loader.impl.launch.knot.KnotClient")
        );
        assert_eq!(resolved.assets.as_deref(), Some("1.19"));
        assert!(resolved.client_download().is_some());
        assert_eq!(
            library_names(&resolved),
            vec!["c:one:1", "shared:lib:1", "p:one:1", "shared:lib:1"]
        );

        let arguments = resolved.arguments.as_ref().unwrap();
        assert_eq!(
            arguments.game,
            vec![
                ArgumentToken::Plain("--child".into()),
                ArgumentToken::Plain("--parent".into())
            ]
        );
        assert_eq!(arguments.jvm, vec![ArgumentToken::Plain("-Dparent".into())]);
        assert_eq!(resolved.game_version(), "1.19.2");
        assert_eq!(source.request_count(), 0);
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[tokio::test]
    async fn missing_parent_is_reported() {
        let paths = scratch();
        let source = RecordingSource::new().with(
            "https://meta/manifest.json",
            r#"{"versions": [{"id": "1.8.9", "type": "release", "url": "https://meta/1.8.9.json"}]}"#,
        );
        let mut resolver =
            VersionResolver::new(&paths, &source).with_manifest_url("https://meta/manifest.json");

        let child = descriptor(serde_json::json!({"id": "forge", "inheritsFrom": "1.7.10"}));
        let err = resolver.resolve(child).await.unwrap_err();

        assert!(matches!(
            err,
            LauncherError::MissingParentVersion { ref child, ref parent }
                if child == "forge" && parent == "1.7.10"
        ));
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[tokio::test]
    async fn self_reference_is_rejected() {
        let paths = scratch();
        let source = RecordingSource::new();
        let mut resolver = VersionResolver::new(&paths, &source);

        let looped = descriptor(serde_json::json!({"id": "loop", "inheritsFrom": "loop"}));
        let err = resolver.resolve(looped).await.unwrap_err();
        assert!(matches!(err, LauncherError::CyclicInheritance { .. }));
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[tokio::test]
    async fn longer_cycle_is_rejected() {
        let paths = scratch();
        write_local(&paths, &serde_json::json!({"id": "b", "inheritsFrom": "c"}));
        write_local(&paths, &serde_json::json!({"id": "c", "inheritsFrom": "a"}));
        let source = RecordingSource::new();
        let mut resolver = VersionResolver::new(&paths, &source);

        let a = descriptor(serde_json::json!({"id": "a", "inheritsFrom": "b"}));
        match resolver.resolve(a).await.unwrap_err() {
            LauncherError::CyclicInheritance { chain } => {
                assert_eq!(chain, vec!["a", "b", "c", "a"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[tokio::test]
    async fn load_fetches_once_and_caches_descriptor() {
        let paths = scratch();
        let source = RecordingSource::new()
            .with(
                "https://meta/manifest.json",
                r#"{"versions": [{"id": "1.8.9", "type": "release", "url": "https://meta/1.8.9.json"}]}"#,
            )
            .with(
                "https://meta/1.8.9.json",
                r#"{"id": "1.8.9", "mainClass": "net.minecraft.client.main.Main"}"#,
            );

        {
            let mut resolver = VersionResolver::new(&paths, &source)
                .with_manifest_url("https://meta/manifest.json");
            let loaded = resolver.load("1.8.9").await.unwrap();
            assert_eq!(loaded.id, "1.8.9");
            assert!(paths.version_json("1.8.9").exists());

            let err = resolver.load("nope").await.unwrap_err();
            assert!(matches!(err, LauncherError::MissingManifestEntry(ref id) if id == "nope"));
        }
        assert_eq!(source.request_count(), 2);

        let mut resolver = VersionResolver::new(&paths, &source);
        resolver.load("1.8.9").await.unwrap();
        assert_eq!(source.request_count(), 2);
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[test]
    fn merge_prefers_child_scalars_and_parent_fallbacks() {
        let parent = descriptor(serde_json::json!({
            "id": "1.12.2",
            "time": "parent-time",
            "mainClass": "parent.Main",
            "minecraftArguments": "--parent",
            "jar": "1.12.2"
        }));
        let child = descriptor(serde_json::json!({
            "id": "1.12.2-forge",
            "inheritsFrom": "1.12.2",
            "minecraftArguments": "--child"
        }));

        let merged = merge(child, parent);
        assert_eq!(merged.time, None);
        assert_eq!(merged.main_class.as_deref(), Some("parent.Main"));
        assert_eq!(merged.minecraft_arguments.as_deref(), Some("--child"));
        assert_eq!(merged.jar.as_deref(), Some("1.12.2"));
        assert_eq!(merged.lineage, vec!["1.12.2"]);
    }
}
