//! # Reconciler
//!
//! Drains the sync queue against the server: each outbox entry is
//! delivered at-least-once, in enqueue order, and removed only after the
//! server acknowledges that exact entry.
//!
//! ## State machine per entry
//!
//! `Pending -> InFlight -> Delivered(removed)`, or back to `Pending` on
//! failure. InFlight exists only in memory, for the duration of one send;
//! a crash mid-send leaves the entry pending and it is retried on the
//! next cycle.
//!
//! ## Single-flight
//!
//! At most one drain pass runs at a time. Overlapping triggers (periodic
//! timer firing while the online-transition drain is still running, or a
//! manual force-sync racing either) collapse into the pass already in
//! progress via `try_lock` on an application-level mutex; the guard spans
//! multiple store transactions plus the network calls, which is why it is
//! not a store-level transaction.
//!
//! ## Retry policy
//!
//! A failing entry is left pending with an exponential backoff gate
//! (30s base, doubling, capped below the periodic drain interval so the
//! 5-minute pass always retries). After `MAX_DELIVERY_ATTEMPTS` the entry
//! is parked for manual review; it is still never deleted except on
//! confirmed delivery. One failing entry never blocks independent entries
//! behind it, and is never reordered ahead of earlier ones.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::model::{PaymentPayload, QueueKind, SyncQueueItem};
use crate::store::LocalStore;
use crate::sync::{ConnectivityMonitor, SyncApi};

/// Attempts before an entry is parked for manual review
pub const MAX_DELIVERY_ATTEMPTS: i64 = 10;

/// Base delay before the first retry
const BACKOFF_BASE_SECS: i64 = 30;

/// Backoff cap; kept below the periodic drain interval so every periodic
/// pass retries every non-parked entry
const BACKOFF_MAX_SECS: i64 = 240;

/// Drains the outbox against the server.
pub struct Reconciler {
    store: LocalStore,
    api: SyncApi,
    monitor: ConnectivityMonitor,
    // single-flight guard; spans store transactions plus network calls
    drain_lock: Mutex<()>,
}

/// Result of one drain request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// A pass ran to completion
    Completed { delivered: usize, failed: usize },
    /// Another pass held the single-flight guard; this call did nothing
    AlreadyRunning,
}

/// Snapshot of queue health for the UI's pending counter.
#[derive(Debug, Clone)]
pub struct SyncStatus {
    /// Undelivered entries, review-parked ones included
    pub pending_count: u64,
    /// Entries parked for manual review
    pub review_count: u64,
    /// Last completed drain pass, RFC3339
    pub last_sync_time: Option<String>,
}

impl Reconciler {
    pub fn new(store: LocalStore, api: SyncApi, monitor: ConnectivityMonitor) -> Arc<Self> {
        Arc::new(Self {
            store,
            api,
            monitor,
            drain_lock: Mutex::new(()),
        })
    }

    /// Drain every due entry once. Background callers: delivery failures
    /// are recorded per entry and never surfaced as a hard error.
    pub async fn drain(&self) -> Result<DrainOutcome, SyncError> {
        let Ok(_guard) = self.drain_lock.try_lock() else {
            debug!("drain already in progress, collapsing trigger");
            return Ok(DrainOutcome::AlreadyRunning);
        };

        let now = chrono::Utc::now().to_rfc3339();
        let items = self.store.due_queue_items(&now).await?;
        let outcome = self.deliver_all(items).await?;
        self.store.set_last_sync_time().await?;
        Ok(outcome)
    }

    /// Explicit caller-invoked drain. Fails fast with `Offline` when
    /// connectivity is down, and ignores per-entry backoff gates.
    pub async fn force_sync(&self) -> Result<DrainOutcome, SyncError> {
        if !self.monitor.is_online() {
            return Err(SyncError::Offline);
        }

        let Ok(_guard) = self.drain_lock.try_lock() else {
            return Ok(DrainOutcome::AlreadyRunning);
        };

        let items = self.store.pending_queue_items().await?;
        let outcome = self.deliver_all(items).await?;
        self.store.set_last_sync_time().await?;
        Ok(outcome)
    }

    /// Queue health for status displays
    pub async fn status(&self) -> Result<SyncStatus, SyncError> {
        Ok(SyncStatus {
            pending_count: self.store.pending_queue_count().await?,
            review_count: self.store.review_queue_count().await?,
            last_sync_time: self.store.last_sync_time().await?,
        })
    }

    /// Download the client snapshot and replace the local copy wholesale.
    pub async fn refresh_clients(&self) -> Result<usize, SyncError> {
        if !self.monitor.is_online() {
            return Err(SyncError::Offline);
        }
        let clients = self.api.fetch_clients().await?;
        self.store.replace_all_clients(&clients).await?;
        self.store.set_last_snapshot_time().await?;
        info!(count = clients.len(), "client snapshot replaced");
        Ok(clients.len())
    }

    /// Put review-parked entries back into rotation (operator action)
    pub async fn reset_review_items(&self) -> Result<u64, SyncError> {
        Ok(self.store.reset_review_items().await?)
    }

    /// Deliver the given entries in order; failures are recorded against
    /// the entry and the pass moves on to the next one.
    async fn deliver_all(&self, items: Vec<SyncQueueItem>) -> Result<DrainOutcome, SyncError> {
        let mut delivered = 0;
        let mut failed = 0;

        for item in items {
            match self.deliver_one(&item).await {
                Ok(()) => {
                    self.store.confirm_delivery(&item).await?;
                    delivered += 1;
                    debug!(item = %item.id, record = item.record_id, "queue entry delivered");
                }
                Err(SyncError::Delivery { message }) => {
                    let gate = backoff_gate(item.retry_count + 1);
                    self.store
                        .record_queue_failure(&item.id, &message, &gate, MAX_DELIVERY_ATTEMPTS)
                        .await?;
                    failed += 1;
                    warn!(
                        item = %item.id,
                        attempt = item.retry_count + 1,
                        error = %message,
                        "delivery failed, entry stays pending"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        if delivered > 0 || failed > 0 {
            info!(delivered, failed, "drain pass finished");
        }
        Ok(DrainOutcome::Completed { delivered, failed })
    }

    /// Send one entry's payload to the server
    async fn deliver_one(&self, item: &SyncQueueItem) -> Result<(), SyncError> {
        match item.kind {
            QueueKind::Payment => {
                let payload: PaymentPayload = serde_json::from_str(&item.payload)
                    .map_err(|e| SyncError::delivery(format!("corrupt payload: {}", e)))?;
                self.api.push_payment(&payload).await
            }
        }
    }
}

/// Earliest next-attempt timestamp for the given attempt number
fn backoff_gate(attempt: i64) -> String {
    let exponent = (attempt - 1).clamp(0, 30) as u32;
    let delay = BACKOFF_BASE_SECS
        .saturating_mul(1i64 << exponent.min(8))
        .min(BACKOFF_MAX_SECS);
    (chrono::Utc::now() + chrono::Duration::seconds(delay)).to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::NewPayment;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn reconciler_for(server: &MockServer) -> (Arc<Reconciler>, LocalStore) {
        let store = LocalStore::open_in_memory().await.unwrap();
        let mut config = Config::new();
        config.set_server_url(server.uri());
        let api = SyncApi::new(config).unwrap();
        let monitor = ConnectivityMonitor::new();
        monitor.set_online();
        (
            Reconciler::new(store.clone(), api, monitor),
            store,
        )
    }

    #[tokio::test]
    async fn test_drain_delivers_and_flips_synced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (reconciler, store) = reconciler_for(&server).await;
        let id = store
            .record_payment(&NewPayment::new("C-001", 250.0).offline())
            .await
            .unwrap();

        let outcome = reconciler.drain().await.unwrap();
        assert_eq!(
            outcome,
            DrainOutcome::Completed {
                delivered: 1,
                failed: 0
            }
        );
        assert!(store.get_payment(id).await.unwrap().unwrap().synced);
        assert_eq!(store.pending_queue_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_entry_stays_pending_and_later_entries_still_run() {
        let server = MockServer::start().await;
        // First request rejected, every later one accepted
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (reconciler, store) = reconciler_for(&server).await;
        let first = store
            .record_payment(&NewPayment::new("C-001", 100.0))
            .await
            .unwrap();
        let second = store
            .record_payment(&NewPayment::new("C-002", 200.0))
            .await
            .unwrap();

        let outcome = reconciler.drain().await.unwrap();
        assert_eq!(
            outcome,
            DrainOutcome::Completed {
                delivered: 1,
                failed: 1
            }
        );

        assert!(!store.get_payment(first).await.unwrap().unwrap().synced);
        assert!(store.get_payment(second).await.unwrap().unwrap().synced);
        assert_eq!(store.pending_queue_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_force_sync_fails_fast_when_offline() {
        let server = MockServer::start().await;
        let store = LocalStore::open_in_memory().await.unwrap();
        let mut config = Config::new();
        config.set_server_url(server.uri());
        let api = SyncApi::new(config).unwrap();
        let monitor = ConnectivityMonitor::new(); // never set online
        let reconciler = Reconciler::new(store, api, monitor);

        assert!(matches!(
            reconciler.force_sync().await,
            Err(SyncError::Offline)
        ));
    }

    #[tokio::test]
    async fn test_force_sync_ignores_backoff_gate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (reconciler, store) = reconciler_for(&server).await;
        store
            .record_payment(&NewPayment::new("C-001", 100.0))
            .await
            .unwrap();

        // First drain fails and gates the entry
        reconciler.drain().await.unwrap();
        // An immediate automatic drain skips the gated entry
        assert_eq!(
            reconciler.drain().await.unwrap(),
            DrainOutcome::Completed {
                delivered: 0,
                failed: 0
            }
        );
        // Force sync does not wait for the gate
        assert_eq!(
            reconciler.force_sync().await.unwrap(),
            DrainOutcome::Completed {
                delivered: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_overlapping_drains_collapse() {
        let server = MockServer::start().await;
        // Slow server so the first pass is still running when the second starts
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (reconciler, store) = reconciler_for(&server).await;
        store
            .record_payment(&NewPayment::new("C-001", 250.0))
            .await
            .unwrap();

        let a = reconciler.clone();
        let b = reconciler.clone();
        let first = tokio::spawn(async move { a.drain().await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let second = b.drain().await.unwrap();

        assert_eq!(second, DrainOutcome::AlreadyRunning);
        assert_eq!(
            first.await.unwrap().unwrap(),
            DrainOutcome::Completed {
                delivered: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn test_status_reflects_pending_and_last_sync() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payments"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let (reconciler, store) = reconciler_for(&server).await;
        store
            .record_payment(&NewPayment::new("C-001", 250.0))
            .await
            .unwrap();

        let status = reconciler.status().await.unwrap();
        assert_eq!(status.pending_count, 1);
        assert!(status.last_sync_time.is_none());

        reconciler.drain().await.unwrap();
        let status = reconciler.status().await.unwrap();
        assert_eq!(status.pending_count, 0);
        assert!(status.last_sync_time.is_some());
    }

    #[tokio::test]
    async fn test_refresh_clients_replaces_snapshot() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {"code": "C-001", "name": "MARIA LOPEZ", "phone": null, "address": null,
             "collector_code": null}
        ]);
        Mock::given(method("GET"))
            .and(path("/api/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let (reconciler, store) = reconciler_for(&server).await;
        let count = reconciler.refresh_clients().await.unwrap();
        assert_eq!(count, 1);
        assert!(store.get_client("C-001").await.unwrap().is_some());
        assert!(store.last_snapshot_time().await.unwrap().is_some());
    }

    #[test]
    fn test_backoff_growth_is_capped() {
        // Gates are timestamps; just check monotone growth up to the cap
        // by parsing the seconds-from-now deltas.
        let parse = |s: &str| {
            chrono::DateTime::parse_from_rfc3339(s)
                .unwrap()
                .with_timezone(&chrono::Utc)
        };
        let now = chrono::Utc::now();
        let d1 = parse(&backoff_gate(1)) - now;
        let d2 = parse(&backoff_gate(2)) - now;
        let d9 = parse(&backoff_gate(9)) - now;
        assert!(d1.num_seconds() >= 29 && d1.num_seconds() <= 31);
        assert!(d2.num_seconds() >= 59 && d2.num_seconds() <= 61);
        assert!(d9.num_seconds() <= BACKOFF_MAX_SECS + 1);
    }
}
