//! # Sync Scheduler
//!
//! Background task driving the reconciler: one immediate drain on every
//! offline-to-online transition, then a periodic drain while the device
//! stays online. Going offline cancels the periodic timer (an in-flight
//! network call is left to fail or time out naturally; its entry simply
//! stays pending). Overlaps between the transition drain and the timer
//! drain collapse inside the reconciler's single-flight guard.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::sync::{ConnectivityMonitor, Reconciler};

/// Handle to the background sync task.
#[derive(Debug)]
pub struct SyncScheduler {
    handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Spawn the scheduler loop. `interval` is the periodic drain period
    /// (5 minutes in production, see `Config::sync_interval`).
    pub fn start(
        reconciler: Arc<Reconciler>,
        monitor: ConnectivityMonitor,
        interval: Duration,
    ) -> Self {
        let mut rx = monitor.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                // Wait for the online transition
                while !*rx.borrow_and_update() {
                    if rx.changed().await.is_err() {
                        return;
                    }
                }

                info!("online, draining sync queue");
                run_drain(&reconciler).await;

                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await; // first tick resolves immediately

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            run_drain(&reconciler).await;
                        }
                        changed = rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            if !*rx.borrow_and_update() {
                                info!("offline, periodic sync cancelled");
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Stop the background task.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One scheduled drain. Delivery failures are already recorded per entry
/// by the reconciler; anything surfacing here is a storage problem, which
/// the background task can only log and wait out.
async fn run_drain(reconciler: &Reconciler) {
    match reconciler.drain().await {
        Ok(outcome) => debug!(?outcome, "scheduled drain finished"),
        Err(e) => warn!(error = %e, "scheduled drain aborted"),
    }
}
