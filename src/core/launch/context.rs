use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::auth::LaunchAccountProfile;
use crate::core::state::{CachePaths, LauncherSettings};
use crate::core::version::{FeatureSet, Platform, RuleEnv};

pub const DEFAULT_RESOLUTION: (u32, u32) = (854, 480);

/// The profile a launch was started from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchProfile {
    pub name: String,
    /// Working directory of the game. Defaults to the cache root.
    pub game_dir: Option<PathBuf>,
    /// Window size override; activates `has_custom_resolution`.
    pub resolution: Option<(u32, u32)>,
    /// Activates `is_demo_user`.
    pub demo: bool,
    /// Overrides `LauncherSettings::max_memory_mb`.
    pub max_memory_mb: Option<u32>,
    pub extra_jvm_args: Vec<String>,
}

impl LaunchProfile {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn features(&self) -> FeatureSet {
        let mut features = FeatureSet::new();
        features.set(FeatureSet::DEMO, self.demo);
        features.set(FeatureSet::CUSTOM_RESOLUTION, self.resolution.is_some());
        features
    }
}

/// Everything one launch needs, passed explicitly through every stage.
#[derive(Debug, Clone)]
pub struct LaunchContext {
    pub account: LaunchAccountProfile,
    pub profile: LaunchProfile,
    pub paths: CachePaths,
    pub settings: LauncherSettings,
    pub platform: Platform,
    pub features: FeatureSet,
}

impl LaunchContext {
    pub fn new(
        paths: CachePaths,
        settings: LauncherSettings,
        account: LaunchAccountProfile,
        profile: LaunchProfile,
    ) -> Self {
        let features = profile.features();
        Self {
            account: account.sanitized(),
            profile,
            paths,
            settings,
            platform: Platform::current(),
            features,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn rule_env(&self) -> RuleEnv<'_> {
        RuleEnv {
            platform: &self.platform,
            features: &self.features,
        }
    }

    pub fn game_dir(&self) -> PathBuf {
        self.profile
            .game_dir
            .clone()
            .unwrap_or_else(|| self.paths.root().to_path_buf())
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.profile.resolution.unwrap_or(DEFAULT_RESOLUTION)
    }

    pub fn max_memory_mb(&self) -> u32 {
        self.profile
            .max_memory_mb
            .unwrap_or(self.settings.max_memory_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_flags_become_features() {
        let profile = LaunchProfile {
            resolution: Some((1280, 720)),
            demo: true,
            ..LaunchProfile::named("main")
        };
        let features = profile.features();
        assert!(features.is_active(FeatureSet::DEMO));
        assert!(features.is_active(FeatureSet::CUSTOM_RESOLUTION));
        assert!(!LaunchProfile::named("x").features().is_active(FeatureSet::DEMO));
    }

    #[test]
    fn defaults_fall_back_to_settings_and_root() {
        let ctx = LaunchContext::new(
            CachePaths::new("/mc"),
            LauncherSettings::default(),
            LaunchAccountProfile::offline("Steve"),
            LaunchProfile::named("main"),
        );
        assert_eq!(ctx.game_dir(), PathBuf::from("/mc"));
        assert_eq!(ctx.resolution(), DEFAULT_RESOLUTION);
        assert_eq!(ctx.max_memory_mb(), 1024);
    }
}
