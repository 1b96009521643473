//! Sync queue (outbox) items.
//!
//! One `SyncQueueItem` exists for every payment with `synced == false`.
//! Items are created atomically with their originating record and deleted
//! only after the server acknowledges that exact item.

use serde::{Deserialize, Serialize};

/// Type tag for a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueKind {
    /// Replay a payment capture server-side
    Payment,
}

impl QueueKind {
    /// Name used in the `sync_queue.kind` column
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueKind::Payment => "payment",
        }
    }

    /// Parse a stored kind tag; unknown tags yield `None` so a drain can
    /// skip rows written by a newer schema
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "payment" => Some(QueueKind::Payment),
            _ => None,
        }
    }
}

/// One outbox entry awaiting delivery to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncQueueItem {
    /// Queue item identifier (UUID string)
    pub id: String,
    /// What kind of mutation this replays
    pub kind: QueueKind,
    /// JSON payload snapshot needed to replay the mutation
    pub payload: String,
    /// Local id of the record this item originated from
    pub record_id: i64,
    /// Enqueue timestamp, RFC3339; drains walk items in this order
    pub enqueued_at: String,
    /// Delivery attempts so far
    pub retry_count: i64,
    /// Timestamp of the last delivery attempt
    pub last_attempt: Option<String>,
    /// Error message from the last failed attempt
    pub last_error: Option<String>,
    /// Earliest timestamp the next automatic attempt may run (backoff gate)
    pub next_attempt_at: Option<String>,
    /// Set once retries are exhausted; excluded from automatic drains
    /// until an operator resets it
    pub needs_review: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        assert_eq!(QueueKind::Payment.as_str(), "payment");
        assert_eq!(QueueKind::parse("payment"), Some(QueueKind::Payment));
    }

    #[test]
    fn test_unknown_kind_is_skipped() {
        assert_eq!(QueueKind::parse("refund"), None);
    }
}
