// ─── Launcher Core ───
// Version resolution, dependency installation and game launch.
//
//   version/    - manifest, descriptors, rules, inheritance resolver
//   maven/      - artifact coordinates and cache paths
//   downloader/ - sequential, SHA-1 checked downloads
//   assets/     - asset index and objects
//   install/    - the five install passes, natives bundle, install lock
//   java/       - managed runtime
//   launch/     - argument templates, classpath, process registry
//   state/      - cache layout, settings, shared state

pub mod archive;
pub mod assets;
pub mod auth;
pub mod downloader;
pub mod error;
pub mod events;
pub mod http;
pub mod install;
pub mod java;
pub mod launch;
pub mod maven;
pub mod state;
pub mod version;
