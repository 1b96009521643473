//! # Payment Operations
//!
//! Capture and retrieval of collection events. `record_payment` is the
//! heart of the offline-first guarantee: the payment row and its outbox
//! entry are written in one SQLite transaction, so a fatal interruption
//! can never leave an orphaned payment without a sync obligation.
//!
//! Payments are never deleted; after delivery the reconciler only flips
//! `synced` on. `requeue_orphans` is the startup sweep that repairs any
//! unsynced payment missing its queue entry.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{NewPayment, PaymentPayload, PaymentRecord, QueueKind};
use crate::store::{LocalStore, Result};

impl LocalStore {
    /// Capture a payment: insert the record and its sync-queue entry as
    /// one atomic unit. Returns the assigned local identifier.
    pub async fn record_payment(&self, new: &NewPayment) -> Result<i64> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            "INSERT INTO payments (client_code, amount, collector_code, offline, synced, captured_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&new.client_code)
        .bind(new.amount)
        .bind(&new.collector_code)
        .bind(new.offline)
        .bind(&new.captured_at)
        .execute(&mut *tx)
        .await?;

        let local_id = result.last_insert_rowid();
        let payload = serde_json::to_string(&PaymentPayload::from_capture(local_id, new))?;

        sqlx::query(
            "INSERT INTO sync_queue (id, kind, payload, record_id, enqueued_at, retry_count)
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(QueueKind::Payment.as_str())
        .bind(&payload)
        .bind(local_id)
        .bind(&new.captured_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(local_id)
    }

    /// Look up one payment by local id
    pub async fn get_payment(&self, id: i64) -> Result<Option<PaymentRecord>> {
        let row = sqlx::query(
            "SELECT id, client_code, amount, collector_code, offline, synced, captured_at
             FROM payments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_payment(&row)?)),
            None => Ok(None),
        }
    }

    /// All payments for one client, newest first
    pub async fn payments_for_client(&self, client_code: &str) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(
            "SELECT id, client_code, amount, collector_code, offline, synced, captured_at
             FROM payments WHERE client_code = ? ORDER BY captured_at DESC",
        )
        .bind(client_code)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    /// All payments captured by one collector, newest first
    pub async fn payments_for_collector(&self, collector_code: &str) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(
            "SELECT id, client_code, amount, collector_code, offline, synced, captured_at
             FROM payments WHERE collector_code = ? ORDER BY captured_at DESC",
        )
        .bind(collector_code)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    /// Payments captured on one calendar day (`YYYY-MM-DD`), oldest first
    pub async fn payments_on_date(&self, date: &str) -> Result<Vec<PaymentRecord>> {
        let pattern = format!("{}%", date);
        let rows = sqlx::query(
            "SELECT id, client_code, amount, collector_code, offline, synced, captured_at
             FROM payments WHERE captured_at LIKE ? ORDER BY captured_at ASC",
        )
        .bind(&pattern)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    /// Payments the server has not acknowledged yet, oldest first
    pub async fn unsynced_payments(&self) -> Result<Vec<PaymentRecord>> {
        let rows = sqlx::query(
            "SELECT id, client_code, amount, collector_code, offline, synced, captured_at
             FROM payments WHERE synced = 0 ORDER BY captured_at ASC",
        )
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_payment).collect()
    }

    /// Flip `synced` after the server acknowledged the payment
    pub async fn mark_payment_synced(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE payments SET synced = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("payments", id));
        }
        Ok(())
    }

    /// Startup sweep: re-enqueue every unsynced payment that lost its
    /// queue entry. Returns how many entries were recreated.
    pub async fn requeue_orphans(&self) -> Result<u64> {
        let rows = sqlx::query(
            "SELECT id, client_code, amount, collector_code, offline, synced, captured_at
             FROM payments p
             WHERE p.synced = 0
               AND NOT EXISTS (
                   SELECT 1 FROM sync_queue q
                   WHERE q.record_id = p.id AND q.kind = 'payment'
               )
             ORDER BY captured_at ASC",
        )
        .fetch_all(self.pool())
        .await?;

        if rows.is_empty() {
            return Ok(0);
        }

        let orphans: Vec<PaymentRecord> =
            rows.iter().map(row_to_payment).collect::<Result<_>>()?;

        let mut tx = self.pool().begin().await?;
        for payment in &orphans {
            let payload = serde_json::to_string(&PaymentPayload::from(payment))?;
            sqlx::query(
                "INSERT INTO sync_queue (id, kind, payload, record_id, enqueued_at, retry_count)
                 VALUES (?, ?, ?, ?, ?, 0)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(QueueKind::Payment.as_str())
            .bind(&payload)
            .bind(payment.id)
            .bind(&payment.captured_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(orphans.len() as u64)
    }
}

fn row_to_payment(row: &SqliteRow) -> Result<PaymentRecord> {
    let map = |e: sqlx::Error| StoreError::unavailable(e.to_string());
    Ok(PaymentRecord {
        id: row.try_get("id").map_err(map)?,
        client_code: row.try_get("client_code").map_err(map)?,
        amount: row.try_get("amount").map_err(map)?,
        collector_code: row.try_get("collector_code").map_err(map)?,
        offline: row.try_get("offline").map_err(map)?,
        synced: row.try_get("synced").map_err(map)?,
        captured_at: row.try_get("captured_at").map_err(map)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_creates_payment_and_queue_entry() {
        let store = LocalStore::open_in_memory().await.unwrap();

        let id = store
            .record_payment(&NewPayment::new("C-001", 250.0).offline())
            .await
            .unwrap();

        let payment = store.get_payment(id).await.unwrap().unwrap();
        assert!(!payment.synced);
        assert!(payment.offline);

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.payments, 1);
        assert_eq!(stats.pending_queue, 1);
    }

    #[tokio::test]
    async fn test_payment_roundtrip_preserves_flags() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let new = NewPayment::new("C-001", 250.0)
            .with_collector("COB-01")
            .offline();
        let id = store.record_payment(&new).await.unwrap();

        let back = store.get_payment(id).await.unwrap().unwrap();
        assert_eq!(back.client_code, "C-001");
        assert_eq!(back.amount, 250.0);
        assert_eq!(back.collector_code.as_deref(), Some("COB-01"));
        assert_eq!(back.captured_at, new.captured_at);
        assert!(back.offline);
        assert!(!back.synced);
    }

    #[tokio::test]
    async fn test_mark_synced() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let id = store
            .record_payment(&NewPayment::new("C-001", 100.0))
            .await
            .unwrap();

        store.mark_payment_synced(id).await.unwrap();
        assert!(store.get_payment(id).await.unwrap().unwrap().synced);
        assert!(store.unsynced_payments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_synced_missing_payment() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let err = store.mark_payment_synced(99).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_filters() {
        let store = LocalStore::open_in_memory().await.unwrap();
        store
            .record_payment(&NewPayment::new("C-001", 100.0).with_collector("COB-01"))
            .await
            .unwrap();
        store
            .record_payment(&NewPayment::new("C-002", 200.0).with_collector("COB-02"))
            .await
            .unwrap();

        assert_eq!(store.payments_for_client("C-001").await.unwrap().len(), 1);
        assert_eq!(
            store.payments_for_collector("COB-02").await.unwrap().len(),
            1
        );

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(store.payments_on_date(&today).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_requeue_orphans() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let id = store
            .record_payment(&NewPayment::new("C-001", 100.0))
            .await
            .unwrap();

        // Simulate an interrupted older build: queue entry lost, payment unsynced
        sqlx::query("DELETE FROM sync_queue")
            .execute(store.pool())
            .await
            .unwrap();
        assert_eq!(store.stats().await.unwrap().pending_queue, 0);

        let requeued = store.requeue_orphans().await.unwrap();
        assert_eq!(requeued, 1);
        assert_eq!(store.stats().await.unwrap().pending_queue, 1);

        // Synced payments are never re-enqueued
        store.mark_payment_synced(id).await.unwrap();
        sqlx::query("DELETE FROM sync_queue")
            .execute(store.pool())
            .await
            .unwrap();
        assert_eq!(store.requeue_orphans().await.unwrap(), 0);
    }
}
