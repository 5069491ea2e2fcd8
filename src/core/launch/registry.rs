use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;

use super::arguments::LaunchCommand;
use super::process::{GameProcess, ProcessExit};

/// Game sessions keyed by session id. A session stays registered after its
/// process exits until its exit status is collected with [`wait`].
///
/// [`wait`]: ProcessRegistry::wait
#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    sessions: Arc<Mutex<HashMap<String, Arc<GameProcess>>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `command` under a fresh session id.
    pub async fn launch(
        &self,
        command: &LaunchCommand,
        events: EventSink,
    ) -> LauncherResult<Arc<GameProcess>> {
        let session = Uuid::new_v4().to_string();
        let process = Arc::new(GameProcess::spawn(command, &session, events)?);

        self.sessions
            .lock()
            .await
            .insert(session.clone(), process.clone());
        info!("Registered game session {} (pid {:?})", session, process.pid());

        Ok(process)
    }

    pub async fn get(&self, session: &str) -> Option<Arc<GameProcess>> {
        self.sessions.lock().await.get(session).cloned()
    }

    /// Ids of the sessions whose process is still running.
    pub async fn sessions(&self) -> Vec<String> {
        self.sessions
            .lock()
            .await
            .iter()
            .filter(|(_, process)| process.is_running())
            .map(|(session, _)| session.clone())
            .collect()
    }

    /// Kill `session`. Killing a session that already exited does nothing.
    pub async fn kill(&self, session: &str) -> LauncherResult<()> {
        let process = self
            .get(session)
            .await
            .ok_or_else(|| LauncherError::SessionNotFound(session.to_string()))?;
        process.kill().await;
        Ok(())
    }

    /// Wait for `session` to exit and collect its status. The session is
    /// forgotten afterwards.
    pub async fn wait(&self, session: &str) -> LauncherResult<ProcessExit> {
        let process = self
            .get(session)
            .await
            .ok_or_else(|| LauncherError::SessionNotFound(session.to_string()))?;
        let exit = process.wait().await;

        self.sessions.lock().await.remove(session);
        debug!("Session {} collected with {:?}", session, exit.code);
        Ok(exit)
    }
}
