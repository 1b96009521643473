//! Ticket log entries.
//!
//! Every rendered receipt is appended here before any transport attempt,
//! so its content stays recoverable even if printing fails. Entries are
//! append-only; the only mutation ever applied is flipping `printed`.

use serde::{Deserialize, Serialize};

/// One rendered receipt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketLogEntry {
    /// Auto-assigned local identifier
    pub id: i64,
    /// Client the receipt was issued to
    pub client_code: String,
    /// The computed fixed-width text body
    pub body: String,
    /// Whether the receipt reached a print surface
    pub printed: bool,
    /// Render timestamp, RFC3339
    pub created_at: String,
}
