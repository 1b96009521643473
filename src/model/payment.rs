//! Payment records and their server wire payload.
//!
//! A `PaymentRecord` is created the instant an agent records a payment.
//! It is mutated only to flip `synced` once the reconciler confirms
//! server acceptance, and it is never deleted locally: the payments
//! collection doubles as the durable audit trail.

use serde::{Deserialize, Serialize};

/// One collection event as persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    /// Auto-assigned local identifier, distinct from any server id
    pub id: i64,
    /// Code of the client who paid
    pub client_code: String,
    /// Amount collected
    pub amount: f64,
    /// Collector who captured the payment
    pub collector_code: Option<String>,
    /// Whether the payment was captured while disconnected
    pub offline: bool,
    /// Whether the server has acknowledged this payment
    pub synced: bool,
    /// Capture timestamp, RFC3339
    pub captured_at: String,
}

/// Input form for capturing a payment; the store assigns the local id.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub client_code: String,
    pub amount: f64,
    pub collector_code: Option<String>,
    pub offline: bool,
    pub captured_at: String,
}

impl NewPayment {
    /// Create a capture for `client_code`, timestamped now.
    pub fn new(client_code: impl Into<String>, amount: f64) -> Self {
        Self {
            client_code: client_code.into(),
            amount,
            collector_code: None,
            offline: false,
            captured_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_collector(mut self, code: impl Into<String>) -> Self {
        self.collector_code = Some(code.into());
        self
    }

    /// Mark the capture as taken while disconnected
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }
}

/// The payload replayed to the server for one payment.
///
/// This is the snapshot stored in the sync queue at capture time, so a
/// later drain sends exactly what was captured even if local state moves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentPayload {
    pub client_code: String,
    pub amount: f64,
    /// Local identifier, sent so the server can deduplicate replays
    pub local_id: i64,
    pub captured_at: String,
    pub collector_code: Option<String>,
    pub offline: bool,
}

impl PaymentPayload {
    /// Build the wire payload for a freshly captured payment.
    pub fn from_capture(local_id: i64, new: &NewPayment) -> Self {
        Self {
            client_code: new.client_code.clone(),
            amount: new.amount,
            local_id,
            captured_at: new.captured_at.clone(),
            collector_code: new.collector_code.clone(),
            offline: new.offline,
        }
    }
}

impl From<&PaymentRecord> for PaymentPayload {
    fn from(record: &PaymentRecord) -> Self {
        Self {
            client_code: record.client_code.clone(),
            amount: record.amount,
            local_id: record.id,
            captured_at: record.captured_at.clone(),
            collector_code: record.collector_code.clone(),
            offline: record.offline,
        }
    }
}
