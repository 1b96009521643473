//! # Sync Queue Operations
//!
//! Outbox reads and the delivery lifecycle. Entries are created inside
//! `record_payment`'s transaction (and by `requeue_orphans`); this file
//! covers everything after that: fetching due items in enqueue order,
//! confirming delivery (delete entry + flip the record's `synced` flag,
//! atomically), and the retry/backoff bookkeeping on failure.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::model::{QueueKind, SyncQueueItem};
use crate::store::{LocalStore, Result};

impl LocalStore {
    /// Items eligible for an automatic drain at time `now` (RFC3339):
    /// not flagged for review and past their backoff gate. Enqueue order.
    pub async fn due_queue_items(&self, now: &str) -> Result<Vec<SyncQueueItem>> {
        let rows = sqlx::query(
            "SELECT id, kind, payload, record_id, enqueued_at, retry_count,
                    last_attempt, last_error, next_attempt_at, needs_review
             FROM sync_queue
             WHERE needs_review = 0
               AND (next_attempt_at IS NULL OR next_attempt_at <= ?)
             ORDER BY enqueued_at ASC",
        )
        .bind(now)
        .fetch_all(self.pool())
        .await?;

        Ok(collect_items(&rows))
    }

    /// All items not flagged for review, ignoring backoff gates.
    /// Used by `force_sync`, which is an explicit operator action.
    pub async fn pending_queue_items(&self) -> Result<Vec<SyncQueueItem>> {
        let rows = sqlx::query(
            "SELECT id, kind, payload, record_id, enqueued_at, retry_count,
                    last_attempt, last_error, next_attempt_at, needs_review
             FROM sync_queue
             WHERE needs_review = 0
             ORDER BY enqueued_at ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(collect_items(&rows))
    }

    /// Count of undelivered entries, review-flagged ones included
    pub async fn pending_queue_count(&self) -> Result<u64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(self.pool())
            .await?;
        Ok(count.0 as u64)
    }

    /// Count of entries parked for manual review
    pub async fn review_queue_count(&self) -> Result<u64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sync_queue WHERE needs_review = 1")
                .fetch_one(self.pool())
                .await?;
        Ok(count.0 as u64)
    }

    /// Confirm delivery of one item: remove it from the outbox and flip
    /// the originating payment's `synced` flag, as one transaction.
    pub async fn confirm_delivery(&self, item: &SyncQueueItem) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let deleted = sqlx::query("DELETE FROM sync_queue WHERE id = ?")
            .bind(&item.id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::unavailable(format!(
                "queue item {} vanished before delivery confirmation",
                item.id
            )));
        }

        sqlx::query("UPDATE payments SET synced = 1 WHERE id = ?")
            .bind(item.record_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Record a failed delivery attempt: bump the retry counter, remember
    /// the error, set the backoff gate, and park the item for review once
    /// `max_attempts` is reached.
    pub async fn record_queue_failure(
        &self,
        item_id: &str,
        error: &str,
        next_attempt_at: &str,
        max_attempts: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE sync_queue SET
                retry_count = retry_count + 1,
                last_attempt = ?,
                last_error = ?,
                next_attempt_at = ?,
                needs_review = CASE WHEN retry_count + 1 >= ? THEN 1 ELSE 0 END
             WHERE id = ?",
        )
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(error)
        .bind(next_attempt_at)
        .bind(max_attempts)
        .bind(item_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Operator action: put review-flagged items back into rotation.
    /// Returns how many were reset.
    pub async fn reset_review_items(&self) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE sync_queue SET
                needs_review = 0,
                retry_count = 0,
                next_attempt_at = NULL
             WHERE needs_review = 1",
        )
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected())
    }
}

/// Map rows to items, skipping rows with kind tags this build does not
/// know (written by a newer schema).
fn collect_items(rows: &[SqliteRow]) -> Vec<SyncQueueItem> {
    rows.iter().filter_map(row_to_item).collect()
}

fn row_to_item(row: &SqliteRow) -> Option<SyncQueueItem> {
    let kind_tag: String = row.try_get("kind").ok()?;
    let kind = QueueKind::parse(&kind_tag)?;
    Some(SyncQueueItem {
        id: row.try_get("id").ok()?,
        kind,
        payload: row.try_get("payload").ok()?,
        record_id: row.try_get("record_id").ok()?,
        enqueued_at: row.try_get("enqueued_at").ok()?,
        retry_count: row.try_get("retry_count").ok()?,
        last_attempt: row.try_get("last_attempt").ok()?,
        last_error: row.try_get("last_error").ok()?,
        next_attempt_at: row.try_get("next_attempt_at").ok()?,
        needs_review: row.try_get("needs_review").ok()?,
    })
}
