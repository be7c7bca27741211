use crate::models::NetworkStatus;
use std::sync::Arc;
use tokio::sync::watch;

/// Explicitly owned view of whether the host can reach the network.
///
/// Clones share the same signal, so whoever detects a transition calls
/// [`Connectivity::set_status`] and every upload path observes it.
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<NetworkStatus>>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(NetworkStatus::online())
    }
}

impl Connectivity {
    pub fn new(initial: NetworkStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn status(&self) -> NetworkStatus {
        self.tx.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.tx.borrow().online
    }

    pub fn set_status(&self, status: NetworkStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            tracing::info!(
                "Network status changed: {}",
                if status.online { "online" } else { "offline" }
            );
            *current = status;
            true
        });
    }

    pub fn set_online(&self, online: bool) {
        let connection_type = self.tx.borrow().connection_type.clone();
        self.set_status(NetworkStatus {
            online,
            connection_type,
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.tx.subscribe()
    }

    /// Resolve once the signal reports online.
    pub async fn wait_until_online(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|status| status.online).await;
    }
}
