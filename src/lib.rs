pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::state::LauncherState;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling this twice keeps the first subscriber.
pub fn init_logging() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pilauncher_lib=debug")),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("PiLauncher core {} starting", env!("CARGO_PKG_VERSION"));
    }
}
