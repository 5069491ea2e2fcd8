// ─── Argument Template Engine ───
// Builds the JVM and game argument lists from a resolved descriptor.
// Order on the command line: JVM args, main class, game args.

use std::path::PathBuf;

use tracing::debug;

use crate::core::error::LauncherResult;
use crate::core::install::InstalledVersion;
use crate::core::version::{ArgumentToken, FeatureSet, RuleEnv, VersionJson};

use super::classpath::{build_classpath, get_classpath_separator, safe_path_str};
use super::context::LaunchContext;
use super::template::SubstitutionMap;

/// Environment variable the game reads to relax the OpenGL version check.
pub const GRAPHICS_OVERRIDE_VAR: &str = "MESA_GL_VERSION_OVERRIDE";

/// A fully assembled process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub java: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
}

/// Every placeholder value a descriptor may reference.
pub fn build_substitution_map(
    ctx: &LaunchContext,
    version: &VersionJson,
    installed: &InstalledVersion,
) -> SubstitutionMap {
    let separator = get_classpath_separator();
    let classpath = build_classpath(&installed.classpath, &installed.version_jar, separator);
    let (width, height) = ctx.resolution();
    let assets_dir = safe_path_str(&ctx.paths.assets_dir());
    let account = &ctx.account;

    SubstitutionMap::new()
        .with("auth_player_name", account.username.as_str())
        .with("auth_uuid", account.uuid.as_str())
        .with("auth_access_token", account.access_token.as_str())
        .with("auth_session", account.access_token.as_str())
        .with("auth_xuid", account.xuid.as_str())
        .with("user_type", account.user_type.as_str())
        .with("clientid", account.client_id.as_str())
        .with("user_properties", "{}")
        .with("version_name", version.id.as_str())
        .with("version_type", version.version_type.as_deref().unwrap_or("release"))
        .with("game_directory", safe_path_str(&ctx.game_dir()))
        .with("library_directory", safe_path_str(&ctx.paths.libraries_dir()))
        .with("assets_root", assets_dir.as_str())
        .with("game_assets", assets_dir.as_str())
        .with("assets_index_name", version.asset_index_id().unwrap_or_default())
        .with("natives_directory", safe_path_str(&installed.natives_dir))
        .with("classpath", classpath)
        .with("classpath_separator", separator)
        .with("primary_jar", safe_path_str(&installed.version_jar))
        .with("profile_name", ctx.profile.name.as_str())
        .with("resolution_width", width.to_string())
        .with("resolution_height", height.to_string())
        .with("language", ctx.settings.language.as_str())
        .with("launcher_name", ctx.settings.launcher_name.as_str())
        .with("launcher_version", ctx.settings.launcher_version.as_str())
}

fn expand_tokens(tokens: &[ArgumentToken], map: &SubstitutionMap, env: &RuleEnv<'_>) -> Vec<String> {
    tokens
        .iter()
        .flat_map(|token| token.values(env))
        .map(|value| map.substitute(value))
        .collect()
}

fn expand_legacy(blob: &str, map: &SubstitutionMap) -> Vec<String> {
    blob.split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| map.substitute(token))
        .collect()
}

fn value_of<'a>(map: &'a SubstitutionMap, key: &str) -> &'a str {
    map.get(key).unwrap_or_default()
}

fn has_prefix(args: &[String], prefix: &str) -> bool {
    args.iter().any(|arg| arg.starts_with(prefix))
}

/// JVM phase.
///
/// Both schemas start with the heap flags unless the descriptor sets them.
/// Modern descriptors then contribute their rule-gated `arguments.jvm`;
/// legacy ones get the LWJGL defaults. The native path, launcher
/// brand, client jar and classpath follow unless already present.
pub fn build_jvm_args(
    version: &VersionJson,
    map: &SubstitutionMap,
    env: &RuleEnv<'_>,
    max_memory_mb: u32,
) -> Vec<String> {
    let modern = version
        .arguments
        .as_ref()
        .filter(|arguments| !arguments.jvm.is_empty());

    let mut args = match modern {
        Some(arguments) => {
            let templated = expand_tokens(&arguments.jvm, map, env);
            let mut args = Vec::with_capacity(templated.len() + 2);
            if !has_prefix(&templated, "-Xmx") {
                args.push(format!("-Xmx{max_memory_mb}M"));
            }
            if !has_prefix(&templated, "-Xmn") {
                args.push("-Xmn128M".to_string());
            }
            args.extend(templated);
            args
        }
        None => vec![
            format!("-Xmx{max_memory_mb}M"),
            "-Xmn128M".to_string(),
            "-Dorg.lwjgl.util.Debug=true".to_string(),
            format!("-Dorg.lwjgl.librarypath={}", value_of(map, "natives_directory")),
        ],
    };

    // Appended only when the descriptor lacks them (DESIGN.md, "Mandatory JVM flags").
    let properties = [
        ("-Djava.library.path=", "natives_directory"),
        ("-Dminecraft.launcher.brand=", "launcher_name"),
        ("-Dminecraft.launcher.version=", "launcher_version"),
        ("-Dminecraft.client.jar=", "primary_jar"),
    ];
    for (prefix, key) in properties {
        if !has_prefix(&args, prefix) {
            args.push(format!("{prefix}{}", value_of(map, key)));
        }
    }

    let has_classpath = args.iter().any(|arg| arg == "-cp" || arg == "-classpath");
    if !has_classpath {
        args.push("-cp".to_string());
        args.push(value_of(map, "classpath").to_string());
    }

    args
}

/// Game phase.
///
/// Legacy descriptors split `minecraftArguments` on spaces and then get
/// `--demo` (demo feature) and `--width/--height` (custom resolution, else
/// 854x480) appended.
pub fn build_game_args(version: &VersionJson, map: &SubstitutionMap, env: &RuleEnv<'_>) -> Vec<String> {
    let modern = version
        .arguments
        .as_ref()
        .filter(|arguments| !arguments.game.is_empty());

    if let Some(arguments) = modern {
        return expand_tokens(&arguments.game, map, env);
    }

    let mut args = version
        .minecraft_arguments
        .as_deref()
        .map(|blob| expand_legacy(blob, map))
        .unwrap_or_default();

    if env.features.is_active(FeatureSet::DEMO) {
        args.push("--demo".to_string());
    }

    let (width, height) = if env.features.is_active(FeatureSet::CUSTOM_RESOLUTION) {
        (
            value_of(map, "resolution_width").to_string(),
            value_of(map, "resolution_height").to_string(),
        )
    } else {
        ("854".to_string(), "480".to_string())
    };
    args.extend(["--width".to_string(), width, "--height".to_string(), height]);

    args
}

pub fn assemble(jvm_args: Vec<String>, main_class: &str, game_args: Vec<String>) -> Vec<String> {
    let mut args = jvm_args;
    args.push(main_class.to_string());
    args.extend(game_args);
    args
}

/// Full command for `version`, installed as `installed`, under `ctx`.
pub fn build_launch_command(
    ctx: &LaunchContext,
    version: &VersionJson,
    installed: &InstalledVersion,
) -> LauncherResult<LaunchCommand> {
    let main_class = version.main_class()?;
    let map = build_substitution_map(ctx, version, installed);
    let env = ctx.rule_env();

    let mut jvm_args = ctx.profile.extra_jvm_args.clone();
    jvm_args.extend(build_jvm_args(version, &map, &env, ctx.max_memory_mb()));
    let game_args = build_game_args(version, &map, &env);

    let args = assemble(jvm_args, main_class, game_args);
    debug!("Launch arguments for {}: {} tokens", version.id, args.len());

    Ok(LaunchCommand {
        java: installed.java.clone(),
        args,
        working_dir: ctx.game_dir(),
        env: vec![(
            GRAPHICS_OVERRIDE_VAR.to_string(),
            ctx.settings.graphics_override.clone(),
        )],
    })
}
