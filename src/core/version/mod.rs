pub mod manifest;
pub mod resolver;
pub mod rules;
pub mod version_file;

pub use manifest::{VersionEntry, VersionManifest, VERSION_MANIFEST_URL};
pub use resolver::{merge, VersionResolver};
pub use rules::{applies, evaluate, FeatureSet, OsRule, Platform, Rule, RuleAction, RuleEnv, RuleVerdict};
pub use version_file::{
    Arguments, ArgumentToken, ArgumentValue, AssetIndexInfo, DownloadArtifact, JavaVersionInfo,
    LibDownloadArtifact, LibraryDownloads, LibraryEntry, LibrarySource, VersionDownloads,
    VersionJson, minor_version,
};
