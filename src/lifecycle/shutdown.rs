//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the server and its background tasks
/// subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Resolve once shutdown is triggered or the coordinator is dropped.
    pub async fn wait(mut rx: broadcast::Receiver<()>) {
        let _ = rx.recv().await;
        tracing::info!("Shutdown signal received");
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
