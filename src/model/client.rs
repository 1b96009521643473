//! Client snapshot records.
//!
//! A locally cached copy of a subset of the server client list. The
//! snapshot is replaced wholesale on each successful download and is
//! read-only from the field agent's perspective; nothing in this crate
//! ever mutates an individual client row.

use serde::{Deserialize, Serialize};

/// One client record as downloaded from the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSnapshot {
    /// Unique client code (the collection key)
    pub code: String,
    /// Client display name
    pub name: String,
    /// Contact phone, if the server has one
    pub phone: Option<String>,
    /// Street address, if the server has one
    pub address: Option<String>,
    /// Outstanding balance at snapshot time
    #[serde(default)]
    pub balance: f64,
    /// Days the account is overdue at snapshot time
    #[serde(default)]
    pub overdue_days: i64,
    /// Accrued late fee at snapshot time
    #[serde(default)]
    pub late_fee: f64,
    /// Code of the collector assigned to this client
    pub collector_code: Option<String>,
}

impl ClientSnapshot {
    /// Create a minimal snapshot record (server-side fields zeroed)
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            phone: None,
            address: None,
            balance: 0.0,
            overdue_days: 0,
            late_fee: 0.0,
            collector_code: None,
        }
    }
}
