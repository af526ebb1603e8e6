//! Deferred removal of staged upload files.
//!
//! Removal is delayed slightly so a just-finished engine process can release
//! its file handle first, and is best-effort: a missing file is a no-op and
//! other failures are logged, never surfaced to the request that staged the
//! file.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// Schedules delayed, best-effort removal of staged files.
#[derive(Debug, Clone)]
pub struct CleanupScheduler {
    delay: Duration,
}

impl CleanupScheduler {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A guard that schedules removal of `paths` when dropped.
    ///
    /// Tying cleanup to drop means it runs on every exit path of the owning
    /// request, including early error returns.
    pub fn guard(&self, paths: Vec<PathBuf>) -> CleanupGuard {
        CleanupGuard {
            paths,
            delay: self.delay,
        }
    }

}

/// Owns staged file paths for the duration of a request.
///
/// On drop, spawns a task that removes each path after the scheduler's delay.
#[derive(Debug)]
pub struct CleanupGuard {
    paths: Vec<PathBuf>,
    delay: Duration,
}

impl CleanupGuard {
    /// Register another staged file with this guard.
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        schedule_removal(std::mem::take(&mut self.paths), self.delay);
    }
}

fn schedule_removal(paths: Vec<PathBuf>, delay: Duration) {
    if paths.is_empty() {
        return;
    }
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        for path in paths {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Removed staged file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // Already gone; nothing to do.
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staged file"),
            }
        }
    });
}
