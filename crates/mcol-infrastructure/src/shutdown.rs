//! Shutdown coordination
//!
//! One `CancellationToken` per process is cancelled by SIGINT, SIGTERM or
//! SIGQUIT. Background tasks are spawned through a `TaskTracker` so the
//! process can wait for them before exiting.
//!
//! ```rust,ignore
//! let coordinator = ShutdownCoordinator::new();
//! coordinator.listen_for_signals();
//! coordinator.spawn("snapshot", async move { /* ... */ });
//! coordinator.wait_for_shutdown().await;
//! coordinator.shutdown(Duration::from_secs(10)).await;
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Process wide shutdown coordinator
#[derive(Clone)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        }
    }

    /// Root cancellation token
    pub fn token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Child token, cancelled with the root
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Whether shutdown has been initiated
    pub fn is_shutting_down(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Number of tracked tasks still running
    pub fn active_tasks(&self) -> usize {
        self.task_tracker.len()
    }

    /// Spawn and track a background task
    pub fn spawn<F>(&self, name: &'static str, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        debug!("[SHUTDOWN] Spawning tracked task: {}", name);
        self.task_tracker.spawn(future)
    }

    /// Cancel the root token when a termination signal arrives
    pub fn listen_for_signals(&self) -> JoinHandle<()> {
        let token = self.cancel_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                signal = wait_for_signal() => {
                    match signal {
                        Ok(name) => info!("[SHUTDOWN] Received {}, shutting down", name),
                        Err(e) => error!("[SHUTDOWN] Signal handler failed: {}", e),
                    }
                    token.cancel();
                }
            }
        })
    }

    /// Block until shutdown is initiated
    pub async fn wait_for_shutdown(&self) {
        self.cancel_token.cancelled().await;
    }

    /// Cancel everything and wait for tracked tasks
    ///
    /// Returns `true` if every task finished before `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        info!(
            "[SHUTDOWN] Initiating graceful shutdown with {}s timeout, {} active tasks",
            timeout.as_secs(),
            self.task_tracker.len()
        );

        self.cancel_token.cancel();
        self.task_tracker.close();

        tokio::select! {
            () = self.task_tracker.wait() => {
                info!("[SHUTDOWN] All tasks completed cleanly");
                true
            }
            () = tokio::time::sleep(timeout) => {
                warn!(
                    "[SHUTDOWN] Timeout reached, {} tasks still active",
                    self.task_tracker.len()
                );
                false
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    Ok(tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    })
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}
