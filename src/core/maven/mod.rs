mod artifact;

pub use artifact::{artifact_path, create_download, MavenArtifact};

/// Default repository for libraries without an explicit download URL.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
