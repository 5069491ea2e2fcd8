mod installer;
mod lock;
mod natives;

pub use installer::{InstalledVersion, Installer};
pub use lock::InstallLock;
pub use natives::{install_natives_bundle, native_tag, natives_bundle_url};
