use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Versions ────────────────────────────────────────
    #[error("Version {0} is not listed in the version manifest")]
    MissingManifestEntry(String),

    #[error("Version {child} inherits from {parent}, which cannot be found")]
    MissingParentVersion { child: String, parent: String },

    #[error("Cyclic inheritance between versions: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("Malformed descriptor at {path:?}: {source}")]
    MalformedDescriptor {
        path: PathBuf,
        source: serde_json::Error,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Bundles / Java ──────────────────────────────────
    #[error("No download source configured for {kind} bundle (expected at {path:?})")]
    BundleUnavailable { kind: &'static str, path: PathBuf },

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    // ── Sessions ────────────────────────────────────────
    #[error("Launch session not found: {0}")]
    SessionNotFound(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// Shells talk to the core over IPC and only need the rendered message.
impl serde::Serialize for LauncherError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
