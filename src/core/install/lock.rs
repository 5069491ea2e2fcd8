// ─── Install Lock ───
// Serializes installers that share one cache directory, across processes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};

const INSTALL_LOCK_STALE_SECS: i64 = 60 * 10;
const RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Serialize, Deserialize)]
struct LockOwner {
    pid: u32,
    timestamp: i64,
}

/// Held while an installer runs. Dropping it removes the lock file.
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
}

impl InstallLock {
    /// Wait until the lock file at `lock_path` can be created.
    ///
    /// A lock whose owner is gone (Linux) or that is older than ten minutes
    /// is treated as abandoned and removed.
    pub async fn acquire(lock_path: &Path) -> LauncherResult<Self> {
        if let Some(parent) = lock_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            match tokio::fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(lock_path)
                .await
            {
                Ok(mut file) => {
                    let owner = LockOwner {
                        pid: std::process::id(),
                        timestamp: Utc::now().timestamp(),
                    };
                    let payload = serde_json::to_vec(&owner)?;
                    file.write_all(&payload)
                        .await
                        .map_err(|source| LauncherError::Io {
                            path: lock_path.to_path_buf(),
                            source,
                        })?;
                    debug!("Acquired install lock {:?}", lock_path);
                    return Ok(Self {
                        path: lock_path.to_path_buf(),
                    });
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    cleanup_stale_lock(lock_path).await;
                    if attempts % 20 == 0 {
                        info!("Waiting for install lock at {:?}", lock_path);
                    }
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(source) => {
                    return Err(LauncherError::Io {
                        path: lock_path.to_path_buf(),
                        source,
                    })
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        if let Err(source) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove lock {:?}: {}", self.path, source);
        }
    }
}

async fn cleanup_stale_lock(lock_path: &Path) {
    let Ok(content) = tokio::fs::read_to_string(lock_path).await else {
        return;
    };
    // A half-written lock belongs to an owner that is still writing it.
    let Ok(owner) = serde_json::from_str::<LockOwner>(&content) else {
        return;
    };

    let expired = Utc::now().timestamp().saturating_sub(owner.timestamp) > INSTALL_LOCK_STALE_SECS;

    #[cfg(target_os = "linux")]
    let dead = !PathBuf::from(format!("/proc/{}", owner.pid)).exists();
    #[cfg(not(target_os = "linux"))]
    let dead = false;

    if expired || dead {
        info!(
            "Removing abandoned install lock {:?} (pid {})",
            lock_path, owner.pid
        );
        let _ = tokio::fs::remove_file(lock_path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_path(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("install-lock-{label}-{}", uuid::Uuid::new_v4()))
            .join("install.lock")
    }

    #[tokio::test]
    async fn drop_releases_lock() {
        let path = lock_path("drop");
        let lock = InstallLock::acquire(&path).await.unwrap();
        assert!(lock.path().exists());
        drop(lock);
        assert!(!path.exists());

        let again = InstallLock::acquire(&path).await.unwrap();
        drop(again);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn second_installer_waits_for_first() {
        let path = lock_path("wait");
        let first = InstallLock::acquire(&path).await.unwrap();

        let waiter_path = path.clone();
        let waiter = tokio::spawn(async move { InstallLock::acquire(&waiter_path).await });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!waiter.is_finished());

        drop(first);
        let second = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        drop(second);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn expired_lock_is_reclaimed() {
        let path = lock_path("stale");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let stale = LockOwner {
            pid: std::process::id(),
            timestamp: 0,
        };
        std::fs::write(&path, serde_json::to_vec(&stale).unwrap()).unwrap();

        let lock = tokio::time::timeout(Duration::from_secs(5), InstallLock::acquire(&path))
            .await
            .unwrap()
            .unwrap();
        drop(lock);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
