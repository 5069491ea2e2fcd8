use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::downloader::DownloadEntry;
use crate::core::error::{LauncherError, LauncherResult};

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version[:classifier]@packaging`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension / packaging type. Defaults to `"jar"`.
    pub packaging: String,
}

impl MavenArtifact {
    /// Parse a Maven coordinate string.
    ///
    /// # Examples
    /// ```
    /// use pilauncher_lib::core::maven::MavenArtifact;
    /// let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
    /// assert_eq!(a.group_id, "net.sf.jopt-simple");
    /// ```
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let (coord_part, packaging_override) = match coord.rfind('@') {
            Some(idx) => (&coord[..idx], Some(&coord[idx + 1..])),
            None => (coord, None),
        };

        let parts: Vec<&str> = coord_part.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        }

        let classifier = match parts.len() {
            3 => None,
            4 => Some(parts[3].to_string()),
            _ => return Err(LauncherError::InvalidMavenCoordinate(coord.to_string())),
        };

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
            classifier,
            packaging: packaging_override.unwrap_or("jar").to_string(),
        })
    }

    /// Same artifact with the classifier replaced.
    pub fn with_classifier(mut self, classifier: Option<&str>) -> Self {
        self.classifier = classifier.map(str::to_string);
        self
    }

    /// Construct the group path portion (`net/sf/jopt-simple`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// `artifactId-version[-classifier].packaging`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// `<repo>/<group_path>/<artifact_id>/<version>/<filename>`
    pub fn url(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        format!(
            "{}/{}/{}/{}/{}",
            base,
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Local path relative to the libraries directory.
    pub fn local_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{}", c)?;
        }
        if self.packaging != "jar" {
            write!(f, "@{}", self.packaging)?;
        }
        Ok(())
    }
}

/// Cache-relative path of `coordinate`. A native `classifier` replaces the
/// one written into the coordinate; `None` keeps it.
pub fn artifact_path(coordinate: &str, classifier: Option<&str>) -> LauncherResult<PathBuf> {
    let artifact = MavenArtifact::parse(coordinate)?;
    let artifact = match classifier {
        Some(native) => artifact.with_classifier(Some(native)),
        None => artifact,
    };
    Ok(artifact.local_path())
}

/// A download for `url` into `local_path`, or `None` when the file is
/// already on disk.
pub fn create_download(url: &str, local_path: &Path) -> Option<DownloadEntry> {
    if local_path.exists() {
        return None;
    }
    Some(DownloadEntry::new(url, local_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_coordinate() {
        let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        assert_eq!(a.group_id, "net.sf.jopt-simple");
        assert_eq!(a.artifact_id, "jopt-simple");
        assert_eq!(a.version, "5.0.4");
        assert_eq!(a.classifier, None);
        assert_eq!(a.packaging, "jar");
    }

    #[test]
    fn parse_with_classifier_and_packaging() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.1:natives-linux").unwrap();
        assert_eq!(a.classifier.as_deref(), Some("natives-linux"));

        let b = MavenArtifact::parse("com.example:lib:1.0@zip").unwrap();
        assert_eq!(b.packaging, "zip");
        assert_eq!(b.to_string(), "com.example:lib:1.0@zip");
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(MavenArtifact::parse("just-a-name").is_err());
        assert!(MavenArtifact::parse("a::1.0").is_err());
    }

    #[test]
    fn url_construction() {
        let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        assert_eq!(
            a.url("https://libraries.minecraft.net/"),
            "https://libraries.minecraft.net/net/sf/jopt-simple/jopt-simple/5.0.4/jopt-simple-5.0.4.jar"
        );
    }

    #[test]
    fn artifact_path_with_and_without_classifier() {
        assert_eq!(
            artifact_path("com.mojang:patchy:1.3.9", None).unwrap(),
            PathBuf::from("com/mojang/patchy/1.3.9/patchy-1.3.9.jar")
        );
        assert_eq!(
            artifact_path("org.lwjgl.lwjgl:lwjgl-platform:2.9.4", Some("natives-linux")).unwrap(),
            PathBuf::from(
                "org/lwjgl/lwjgl/lwjgl-platform/2.9.4/lwjgl-platform-2.9.4-natives-linux.jar"
            )
        );
        assert_eq!(
            artifact_path("org.lwjgl:lwjgl:3.3.1:natives-linux", None).unwrap(),
            PathBuf::from("org/lwjgl/lwjgl/3.3.1/lwjgl-3.3.1-natives-linux.jar")
        );
    }

    #[test]
    fn create_download_skips_existing_files() {
        let temp = std::env::temp_dir().join(format!("artifact-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp).unwrap();
        let present = temp.join("present.jar");
        std::fs::write(&present, b"jar").unwrap();

        assert!(create_download("https://example.com/a.jar", &present).is_none());

        let missing = temp.join("missing.jar");
        let entry = create_download("https://example.com/b.jar", &missing).unwrap();
        assert_eq!(entry.url, "https://example.com/b.jar");
        assert_eq!(entry.dest, missing);

        let _ = std::fs::remove_dir_all(&temp);
    }
}
