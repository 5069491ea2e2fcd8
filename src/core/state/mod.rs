mod app_state;
mod paths;
mod settings;

pub use app_state::LauncherState;
pub use paths::CachePaths;
pub use settings::LauncherSettings;
