// ─── Entry Points ───
// Programmatic surface used by the launcher shell.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::core::auth::{AccountStore, LaunchAccountProfile};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::install::{InstalledVersion, Installer};
use crate::core::launch::{build_launch_command, GameProcess, LaunchContext, LaunchProfile, ProcessExit};
use crate::core::state::LauncherState;
use crate::core::version::{VersionEntry, VersionJson, VersionManifest, VersionResolver};

/// Versions listed by the remote manifest.
pub async fn list_remote_versions(state: &LauncherState) -> LauncherResult<Vec<VersionEntry>> {
    let manifest =
        VersionManifest::fetch(state.source.as_ref(), &state.settings.version_manifest_url).await?;
    Ok(manifest.versions)
}

/// Ids of the versions that have a descriptor under `<root>/versions/`.
pub fn list_installed_versions(root: &Path) -> LauncherResult<Vec<String>> {
    let versions_dir = root.join("versions");
    let entries = match std::fs::read_dir(&versions_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LauncherError::Io {
                path: versions_dir,
                source,
            })
        }
    };

    let mut ids: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let id = entry.file_name().to_string_lossy().to_string();
            entry
                .path()
                .join(format!("{id}.json"))
                .is_file()
                .then_some(id)
        })
        .collect();
    ids.sort();
    Ok(ids)
}

/// Launch profile for `account_id` from the account store file.
pub fn load_account(accounts_file: &Path, account_id: &str) -> LauncherResult<LaunchAccountProfile> {
    AccountStore::load(accounts_file)?
        .profile(account_id)
        .ok_or_else(|| LauncherError::Other(format!("Unknown account {account_id}")))
}

/// Resolve and install `version_id` for `ctx`.
pub async fn prepare_version(
    state: &LauncherState,
    ctx: &LaunchContext,
    version_id: &str,
    events: EventSink,
) -> LauncherResult<(VersionJson, InstalledVersion)> {
    let mut resolver = VersionResolver::new(&ctx.paths, state.source.as_ref())
        .with_manifest_url(&ctx.settings.version_manifest_url);
    let version = resolver.resolve_id(version_id).await?;

    let installer = Installer::new(ctx, state.downloader(events));
    let installed = installer.install(&version).await?;
    Ok((version, installed))
}

/// Resolve, install and start `version_id`. The returned handle is also
/// tracked in the state's process registry under its session id.
pub async fn launch_version(
    state: &LauncherState,
    version_id: &str,
    profile: LaunchProfile,
    account: LaunchAccountProfile,
    events: EventSink,
) -> LauncherResult<Arc<GameProcess>> {
    let ctx = LaunchContext::new(
        state.paths.clone(),
        state.settings.clone(),
        account,
        profile,
    );

    let (version, installed) = match prepare_version(state, &ctx, version_id, events.clone()).await {
        Ok(prepared) => prepared,
        Err(err) => {
            error!("Preparing {} failed: {}", version_id, err);
            return Err(err);
        }
    };

    let command = build_launch_command(&ctx, &version, &installed)?;
    let process = state.processes.launch(&command, events).await?;
    info!(
        "Launched {} as session {} for {}",
        version_id,
        process.session(),
        ctx.account.username
    );
    Ok(process)
}

pub async fn kill_session(state: &LauncherState, session: &str) -> LauncherResult<()> {
    state.processes.kill(session).await
}

pub async fn wait_session(state: &LauncherState, session: &str) -> LauncherResult<ProcessExit> {
    state.processes.wait(session).await
}
