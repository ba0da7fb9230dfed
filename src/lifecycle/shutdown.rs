//! Graceful shutdown for the gateway.
//!
//! The server stops accepting and drains in-flight requests once
//! [`Shutdown::trigger`] fires, from an OS signal or from a test harness.

use std::future::Future;

use tokio::sync::broadcast;

use crate::lifecycle::signals::wait_for_shutdown_signal;

/// Cloneable shutdown switch.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Trigger once the process receives Ctrl+C or SIGTERM.
    pub fn trigger_on_signal(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            shutdown.trigger();
        });
    }

    /// Resolves when shutdown is triggered.
    ///
    /// Subscribes at call time: only triggers after this call are seen.
    pub fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Stop the server. A no-op when nothing is serving.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_resolves_every_waiter() {
        let shutdown = Shutdown::new();
        let server = shutdown.signalled();
        let other = shutdown.clone().signalled();

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), async {
            server.await;
            other.await;
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_earlier_trigger_is_not_seen() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let late = shutdown.signalled();
        assert!(tokio::time::timeout(Duration::from_millis(50), late).await.is_err());
    }
}
