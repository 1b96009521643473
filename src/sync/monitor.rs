//! # Connectivity Monitor
//!
//! Maintains the device's boolean connectivity state and notifies
//! observers on transitions. The monitor holds no data of its own and
//! performs no I/O: platform glue feeds it transport-level signals via
//! `set_online` / `set_offline`, and those calls never block (they only
//! flip in-memory state behind a watch channel).

use std::sync::Arc;

use tokio::sync::watch;

/// Shared connectivity state.
///
/// Cheap to clone; all clones observe the same state. New monitors start
/// offline until the platform reports otherwise.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Current connectivity state
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Signal that the transport came online. No-op if already online.
    pub fn set_online(&self) {
        self.tx.send_if_modified(|state| {
            if *state {
                false
            } else {
                *state = true;
                true
            }
        });
    }

    /// Signal that the transport went offline. No-op if already offline.
    pub fn set_offline(&self) {
        self.tx.send_if_modified(|state| {
            if *state {
                *state = false;
                true
            } else {
                false
            }
        });
    }

    /// Subscribe to transition events. The receiver yields a change
    /// notification for every online/offline flip.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_offline() {
        let monitor = ConnectivityMonitor::new();
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn test_transitions() {
        let monitor = ConnectivityMonitor::new();
        monitor.set_online();
        assert!(monitor.is_online());
        monitor.set_offline();
        assert!(!monitor.is_online());
    }

    #[tokio::test]
    async fn test_subscriber_sees_transition() {
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.set_online();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_redundant_signals_do_not_notify() {
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.set_offline(); // already offline
        assert!(!rx.has_changed().unwrap());

        monitor.set_online();
        monitor.set_online(); // duplicate
        rx.changed().await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let monitor = ConnectivityMonitor::new();
        let clone = monitor.clone();
        monitor.set_online();
        assert!(clone.is_online());
    }
}
