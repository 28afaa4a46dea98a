//! Signal-triggered graceful shutdown: stop accepting, let in-flight output
//! drain, then close everything that is still open.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::listener::Listener;

const DRAIN_DELAY: Duration = Duration::from_millis(100);

/// Waits for a termination signal, then coordinates an orderly shutdown of a
/// set of listeners and their active sessions.
pub struct ShutdownCoordinator {
    trigger: Arc<Notify>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        ShutdownCoordinator { trigger: Arc::new(Notify::new()) }
    }

    /// A handle other tasks (the signal listener) can notify to trigger shutdown.
    pub fn trigger_handle(&self) -> Arc<Notify> {
        self.trigger.clone()
    }

    /// Runs until triggered, then closes `listeners` in two stages with a
    /// drain pause between them, and a third after the sessions are closed.
    pub async fn run(self, listeners: Vec<Arc<Listener>>) {
        self.trigger.notified().await;
        log::info!("shutdown requested: closing {} listener(s)", listeners.len());

        for listener in &listeners {
            listener.stop_accepting();
        }
        tokio::time::sleep(DRAIN_DELAY).await;

        log::info!("closing active sessions");
        for listener in &listeners {
            listener.close_sessions();
        }
        tokio::time::sleep(DRAIN_DELAY).await;

        log::info!("shutdown complete");
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for SIGINT, SIGTERM, or SIGQUIT (Ctrl+C on non-Unix platforms).
#[cfg(unix)]
pub async fn wait_for_termination_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigquit = signal(SignalKind::quit()).expect("failed to install SIGQUIT handler");

    tokio::select! {
        _ = sigint.recv() => log::info!("received SIGINT"),
        _ = sigterm.recv() => log::info!("received SIGTERM"),
        _ = sigquit.recv() => log::info!("received SIGQUIT"),
    }
}

#[cfg(not(unix))]
pub async fn wait_for_termination_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("received ctrl-c");
}
