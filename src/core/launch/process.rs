// ─── Process Launcher ───
// Spawns the game, streams its output and exposes wait/kill on a handle.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{self, EventSink, LaunchEvent};

use super::arguments::LaunchCommand;

const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// How a game process ended. The exit code is reported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessExit {
    pub code: Option<i32>,
    /// Anything was written to standard error.
    pub stderr_seen: bool,
}

impl ProcessExit {
    pub fn is_failure(&self) -> bool {
        self.stderr_seen || self.code != Some(0)
    }
}

/// Handle to one running game session.
#[derive(Debug)]
pub struct GameProcess {
    session: String,
    pid: Option<u32>,
    exit: watch::Receiver<Option<ProcessExit>>,
    kill_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl GameProcess {
    /// Start `command` and begin streaming its output into `events`.
    pub fn spawn(command: &LaunchCommand, session: &str, events: EventSink) -> LauncherResult<Self> {
        std::fs::create_dir_all(&command.working_dir).map_err(|source| LauncherError::Io {
            path: command.working_dir.clone(),
            source,
        })?;

        let mut cmd = Command::new(&command.java);
        cmd.args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        info!("[{}] Launching with Java: {:?}", session, command.java);
        debug!("Command (copy/paste): {}", format_command_for_logs(command));

        let mut child = cmd
            .spawn()
            .map_err(|e| LauncherError::JavaExecution(format!("{:?}: {e}", command.java)))?;
        let pid = child.id();

        let stderr_seen = Arc::new(AtomicBool::new(false));
        let stdout_task = child.stdout.take().map(|stdout| {
            tokio::spawn(pump_lines(
                stdout,
                session.to_string(),
                events.clone(),
                None,
            ))
        });
        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(pump_lines(
                stderr,
                session.to_string(),
                events.clone(),
                Some(stderr_seen.clone()),
            ))
        });

        let (exit_tx, exit_rx) = watch::channel(None);
        let (kill_tx, mut kill_rx) = oneshot::channel::<()>();
        let monitor_session = session.to_string();

        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                Ok(()) = &mut kill_rx => {
                    info!("[{}] Kill requested", monitor_session);
                    if let Err(e) = child.start_kill() {
                        warn!("[{}] Could not signal process: {}", monitor_session, e);
                    }
                    child.wait().await
                }
            };

            // Drain the pipes so every line is reported before Closed. A
            // grandchild may keep them open, so the wait is bounded.
            for mut task in [stdout_task, stderr_task].into_iter().flatten() {
                if tokio::time::timeout(PIPE_DRAIN_TIMEOUT, &mut task).await.is_err() {
                    debug!("[{}] Output still open after exit, detaching", monitor_session);
                    task.abort();
                }
            }

            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    error!("[{}] Waiting for the game failed: {}", monitor_session, e);
                    None
                }
            };
            let exit = ProcessExit {
                code,
                stderr_seen: stderr_seen.load(Ordering::SeqCst),
            };

            info!("[{}] Game process closed with code {:?}", monitor_session, code);
            events::emit(
                &events,
                LaunchEvent::Closed {
                    session: monitor_session,
                    code,
                },
            );
            let _ = exit_tx.send(Some(exit));
        });

        Ok(Self {
            session: session.to_string(),
            pid,
            exit: exit_rx,
            kill_tx: Mutex::new(Some(kill_tx)),
        })
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_running(&self) -> bool {
        self.exit.borrow().is_none()
    }

    /// Wait for the process to end.
    pub async fn wait(&self) -> ProcessExit {
        let mut exit = self.exit.clone();
        let published = exit.wait_for(Option::is_some).await.map(|state| *state);
        // The monitor always publishes before it goes away.
        published.ok().flatten().unwrap_or(ProcessExit {
            code: None,
            stderr_seen: false,
        })
    }

    /// Ask the process to terminate. Killing a finished process is a no-op.
    pub async fn kill(&self) {
        if let Some(tx) = self.kill_tx.lock().await.take() {
            let _ = tx.send(());
        }
    }
}

async fn pump_lines<R>(reader: R, session: String, events: EventSink, stderr: Option<Arc<AtomicBool>>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match &stderr {
                None => {
                    info!("[mc:{}][stdout] {}", session, line);
                    events::emit(
                        &events,
                        LaunchEvent::Stdout {
                            session: session.clone(),
                            line,
                        },
                    );
                }
                Some(flag) => {
                    warn!("[mc:{}][stderr] {}", session, line);
                    flag.store(true, Ordering::SeqCst);
                    events::emit(
                        &events,
                        LaunchEvent::Failure {
                            session: session.clone(),
                            line,
                        },
                    );
                }
            },
            Ok(None) => break,
            Err(e) => {
                debug!("[mc:{}] Output stream ended: {}", session, e);
                break;
            }
        }
    }
}

fn format_command_for_logs(command: &LaunchCommand) -> String {
    let program = shell_escape(&command.java.to_string_lossy());
    let args = command
        .args
        .iter()
        .map(|arg| shell_escape(arg))
        .collect::<Vec<_>>()
        .join(" ");

    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args)
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use super::*;

    pub(crate) fn shell(script: &str) -> LaunchCommand {
        LaunchCommand {
            java: PathBuf::from("sh"),
            args: vec!["-c".to_string(), script.to_string()],
            working_dir: std::env::temp_dir(),
            env: vec![("MESA_GL_VERSION_OVERRIDE".to_string(), "4.5".to_string())],
        }
    }

    #[test]
    fn escapes_only_when_needed() {
        assert_eq!(shell_escape("-Xmx1024M"), "-Xmx1024M");
        assert_eq!(shell_escape("a b"), "\"a b\"");
        assert_eq!(shell_escape(""), "\"\"");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn streams_output_and_reports_raw_exit_code() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let process = GameProcess::spawn(
            &shell("echo hello; echo \"$MESA_GL_VERSION_OVERRIDE\"; echo oops >&2; exit 3"),
            "s1",
            Some(tx),
        )
        .unwrap();

        let exit = tokio::time::timeout(Duration::from_secs(10), process.wait())
            .await
            .unwrap();
        assert_eq!(exit.code, Some(3));
        assert!(exit.stderr_seen);
        assert!(exit.is_failure());
        assert!(!process.is_running());

        let mut stdout = Vec::new();
        let mut failures = Vec::new();
        let mut closed = None;
        while let Ok(event) = rx.try_recv() {
            match event {
                LaunchEvent::Stdout { line, .. } => stdout.push(line),
                LaunchEvent::Failure { line, .. } => failures.push(line),
                LaunchEvent::Closed { code, .. } => closed = Some(code),
                LaunchEvent::Progress { .. } => {}
            }
        }
        assert_eq!(stdout, vec!["hello", "4.5"]);
        assert_eq!(failures, vec!["oops"]);
        assert_eq!(closed, Some(Some(3)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn clean_exit_is_not_a_failure() {
        let process = GameProcess::spawn(&shell("exit 0"), "s2", None).unwrap();
        let exit = process.wait().await;
        assert_eq!(exit.code, Some(0));
        assert!(!exit.is_failure());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kill_terminates_the_process() {
        let process = GameProcess::spawn(&shell("exec sleep 30"), "s3", None).unwrap();
        assert!(process.is_running());

        process.kill().await;
        let exit = tokio::time::timeout(Duration::from_secs(10), process.wait())
            .await
            .unwrap();
        assert_eq!(exit.code, None);
        assert!(!process.is_running());

        // A second kill after exit does nothing.
        process.kill().await;
    }

    #[tokio::test]
    async fn missing_binary_is_a_java_error() {
        let mut command = shell("true");
        command.java = PathBuf::from("/nonexistent/bin/java");
        let err = GameProcess::spawn(&command, "s4", None).unwrap_err();
        assert!(matches!(err, LauncherError::JavaExecution(_)));
    }
}
