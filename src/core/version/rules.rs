// ─── Rule Evaluator ───
// Decides whether a rule-gated library or argument token applies to the
// current platform and feature set.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identity of the machine we are installing for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Mojang OS identifier: `linux`, `windows` or `osx`.
    pub os_name: String,
    /// Mojang arch identifier: `x86`, `x86_64`, `arm32` or `arm64`.
    pub arch: String,
    /// Pointer width as used in `${arch}` classifier substitution.
    pub pointer_width: &'static str,
}

impl Platform {
    pub fn current() -> Self {
        let os_name = if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "macos") {
            "osx"
        } else {
            "linux"
        };

        let arch = match std::env::consts::ARCH {
            "x86" => "x86",
            "x86_64" => "x86_64",
            "arm" => "arm32",
            "aarch64" => "arm64",
            other => other,
        };

        let pointer_width = if cfg!(target_pointer_width = "64") {
            "64"
        } else {
            "32"
        };

        Self {
            os_name: os_name.to_string(),
            arch: arch.to_string(),
            pointer_width,
        }
    }

    /// Suffix used to pick platform bundles (`arm32`, `arm64`, `32`, `64`).
    pub fn bitness(&self) -> String {
        if self.arch.starts_with("arm") {
            self.arch.clone()
        } else {
            self.pointer_width.to_string()
        }
    }
}

/// Set of active optional launch features (`is_demo_user`, `has_custom_resolution`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureSet {
    active: BTreeSet<String>,
}

impl FeatureSet {
    pub const DEMO: &'static str = "is_demo_user";
    pub const CUSTOM_RESOLUTION: &'static str = "has_custom_resolution";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: &str) -> Self {
        self.active.insert(feature.to_string());
        self
    }

    pub fn set(&mut self, feature: &str, enabled: bool) {
        if enabled {
            self.active.insert(feature.to_string());
        } else {
            self.active.remove(feature);
        }
    }

    pub fn is_active(&self, feature: &str) -> bool {
        self.active.contains(feature)
    }
}

/// Everything a rule can be evaluated against.
#[derive(Debug, Clone)]
pub struct RuleEnv<'a> {
    pub platform: &'a Platform,
    pub features: &'a FeatureSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
    /// Unrecognized action. Treated like `allow`.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl OsRule {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            arch: None,
        }
    }

    /// Name matches by substring of the current OS identifier, arch exactly.
    fn matches(&self, platform: &Platform) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .map_or(true, |name| platform.os_name.contains(name));
        let arch_ok = self.arch.as_deref().map_or(true, |arch| platform.arch == arch);
        name_ok && arch_ok
    }
}

/// Outcome of folding a rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleVerdict {
    /// No rule was processed.
    Unset,
    Allow,
    Deny,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
            features: None,
        }
    }

    pub fn disallow() -> Self {
        Self {
            action: RuleAction::Disallow,
            os: None,
            features: None,
        }
    }

    pub fn on_os(mut self, name: &str) -> Self {
        self.os = Some(OsRule::named(name));
        self
    }

    pub fn with_feature(mut self, feature: &str, expected: bool) -> Self {
        self.features
            .get_or_insert_with(BTreeMap::new)
            .insert(feature.to_string(), expected);
        self
    }

    fn is_constrained(&self) -> bool {
        self.os.is_some() || self.features.is_some()
    }

    fn constraint_matches(&self, env: &RuleEnv<'_>) -> bool {
        let os_ok = self.os.as_ref().map_or(true, |os| os.matches(env.platform));
        let features_ok = self.features.as_ref().map_or(true, |wanted| {
            wanted
                .iter()
                .all(|(name, expected)| env.features.is_active(name) == *expected)
        });
        os_ok && features_ok
    }

    /// Verdict of this single rule, independent of any earlier rule.
    ///
    /// - allow:    no constraint → allow; constraint → allow iff it matches.
    /// - disallow: no constraint → deny;  constraint → allow iff it does NOT match.
    pub fn verdict(&self, env: &RuleEnv<'_>) -> RuleVerdict {
        let matched = self.constraint_matches(env);
        let allowed = match self.action {
            RuleAction::Allow | RuleAction::Unknown => !self.is_constrained() || matched,
            RuleAction::Disallow => self.is_constrained() && !matched,
        };

        if allowed {
            RuleVerdict::Allow
        } else {
            RuleVerdict::Deny
        }
    }
}

/// Left-fold over `rules` in declaration order where every rule overwrites
/// the running verdict. The LAST rule decides; this is not an AND/OR of the
/// rules and reordering them changes the outcome.
pub fn evaluate(rules: &[Rule], env: &RuleEnv<'_>) -> RuleVerdict {
    rules
        .iter()
        .fold(RuleVerdict::Unset, |_previous, rule| rule.verdict(env))
}

/// `true` when an item gated by `rules` should be used. Empty lists apply.
pub fn applies(rules: &[Rule], env: &RuleEnv<'_>) -> bool {
    !matches!(evaluate(rules, env), RuleVerdict::Deny)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(os: &str) -> Platform {
        Platform {
            os_name: os.to_string(),
            arch: "x86_64".into(),
            pointer_width: "64",
        }
    }

    fn check(rules: &[Rule], os: &str, features: &FeatureSet) -> bool {
        let platform = platform(os);
        applies(
            rules,
            &RuleEnv {
                platform: &platform,
                features,
            },
        )
    }

    #[test]
    fn empty_rules_apply() {
        assert!(check(&[], "linux", &FeatureSet::new()));
    }

    #[test]
    fn unconstrained_allow_applies_everywhere() {
        for os in ["linux", "windows", "osx"] {
            assert!(check(&[Rule::allow()], os, &FeatureSet::new()));
        }
    }

    #[test]
    fn later_disallow_overrides_earlier_allow() {
        let rules = [Rule::allow().on_os("osx"), Rule::disallow()];
        assert!(!check(&rules, "linux", &FeatureSet::new()));
        // The osx allow is also overridden on osx itself.
        assert!(!check(&rules, "osx", &FeatureSet::new()));
    }

    #[test]
    fn reordering_changes_verdict() {
        let forward = [Rule::allow(), Rule::disallow().on_os("osx")];
        let reversed = [Rule::disallow().on_os("osx"), Rule::allow()];

        assert!(!check(&forward, "osx", &FeatureSet::new()));
        assert!(check(&reversed, "osx", &FeatureSet::new()));
    }

    #[test]
    fn constrained_disallow_allows_other_platforms() {
        let rules = [Rule::disallow().on_os("osx")];
        assert!(check(&rules, "linux", &FeatureSet::new()));
        assert!(!check(&rules, "osx", &FeatureSet::new()));
    }

    #[test]
    fn os_name_matches_by_substring() {
        let rules = [Rule::allow().on_os("win")];
        assert!(check(&rules, "windows", &FeatureSet::new()));
        assert!(!check(&rules, "linux", &FeatureSet::new()));
    }

    #[test]
    fn arch_constraint_is_exact() {
        let mut rule = Rule::allow();
        rule.os = Some(OsRule {
            name: None,
            arch: Some("x86".into()),
        });
        assert!(!check(&[rule], "linux", &FeatureSet::new()));
    }

    #[test]
    fn feature_rules_follow_active_features() {
        let rules = [Rule::allow().with_feature(FeatureSet::DEMO, true)];
        assert!(!check(&rules, "linux", &FeatureSet::new()));
        assert!(check(
            &rules,
            "linux",
            &FeatureSet::new().with(FeatureSet::DEMO)
        ));
    }

    #[test]
    fn unknown_action_is_permissive() {
        let rule: Rule = serde_json::from_str(r#"{"action": "maybe"}"#).unwrap();
        assert_eq!(rule.action, RuleAction::Unknown);
        assert!(check(&[rule], "linux", &FeatureSet::new()));
    }

    #[test]
    fn fold_reports_unset_for_empty_list() {
        let platform = platform("linux");
        let features = FeatureSet::new();
        let env = RuleEnv {
            platform: &platform,
            features: &features,
        };
        assert_eq!(evaluate(&[], &env), RuleVerdict::Unset);
        assert_eq!(evaluate(&[Rule::disallow()], &env), RuleVerdict::Deny);
    }
}
