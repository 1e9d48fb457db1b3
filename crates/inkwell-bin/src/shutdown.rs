// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! Listens for SIGTERM and Ctrl+C and fans the notification out to every
//! subscriber, the HTTP server included.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: Arc<watch::Sender<bool>>,
    initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Initiates shutdown. Only the first call has an effect.
    pub fn initiate_shutdown(&self) {
        if self
            .initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            self.sender.send_replace(true);
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Returns a future that resolves once shutdown is initiated.
    ///
    /// Resolves immediately if shutdown already happened.
    pub fn signal(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        async move {
            // Err means the coordinator is gone, which also ends the wait.
            let _ = receiver.wait_for(|initiated| *initiated).await;
        }
    }

    /// Spawns a task that initiates shutdown on SIGTERM or Ctrl+C.
    pub fn listen_for_os_signals(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            coordinator.initiate_shutdown();
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("initiated", &self.is_shutdown_initiated())
            .finish()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "Failed to register SIGTERM handler, listening for Ctrl+C only");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = wait_for_ctrl_c() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_resolves_after_initiate() {
        let coordinator = ShutdownCoordinator::new();
        let signal = coordinator.signal();
        let waiter = tokio::spawn(signal);

        assert!(!coordinator.is_shutdown_initiated());
        coordinator.initiate_shutdown();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(coordinator.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_signal_after_shutdown_is_immediate() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();

        tokio::time::timeout(Duration::from_millis(100), coordinator.signal())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let coordinator = ShutdownCoordinator::new();
        let clone = coordinator.clone();
        clone.initiate_shutdown();
        assert!(coordinator.is_shutdown_initiated());
    }
}
