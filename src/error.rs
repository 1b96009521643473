//! Error Types
//!
//! This module defines the error taxonomy for the field-collection core.
//! Each subsystem has its own error enum so that callers see only the
//! failures that can actually reach them.
//!
//! # Error Categories
//!
//! - `StoreError` - the local record store cannot be opened, written or read
//! - `SyncError` - connectivity or delivery failures during reconciliation
//! - `PrintError` - receipt transport failures and fallback problems
//!
//! # Propagation Policy
//!
//! Storage errors always propagate to the immediate caller. Delivery
//! errors are swallowed at the reconciler boundary (a failing queue item
//! stays pending and is only observable through `Reconciler::status`).
//! Transport errors are translated into a fallback print action rather
//! than propagated.
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across
//! task boundaries.
use thiserror::Error;

/// Errors raised by the local record store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be opened or written
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable error message
        message: String,
    },

    /// A record or payload could not be (de)serialized
    #[error("serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// A record lookup by identifier found nothing
    #[error("no record {id} in collection '{collection}'")]
    NotFound {
        /// Collection that was queried
        collection: &'static str,
        /// Local identifier that was requested
        id: i64,
    },
}

impl StoreError {
    /// Create a new storage-unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(collection: &'static str, id: i64) -> Self {
        Self::NotFound { collection, id }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Errors raised while reconciling the sync queue with the server
#[derive(Debug, Error)]
pub enum SyncError {
    /// No connectivity at call time
    #[error("device is offline")]
    Offline,

    /// The server rejected a delivery attempt, or the network failed
    #[error("delivery failed: {message}")]
    Delivery {
        /// Human-readable error message
        message: String,
    },

    /// The local store failed underneath the reconciler
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Create a new delivery-failed error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::delivery(err.to_string())
    }
}

/// Errors raised by the receipt print path
#[derive(Debug, Error)]
pub enum PrintError {
    /// No wireless capability or no paired device
    #[error("print transport unavailable: {message}")]
    TransportUnavailable {
        /// Human-readable error message
        message: String,
    },

    /// The wireless write itself failed
    #[error("print transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The best-effort fallback surface failed too
    #[error("fallback print failed: {message}")]
    Fallback {
        /// Human-readable error message
        message: String,
    },

    /// The ticket log could not be written
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PrintError {
    /// Create a new transport-unavailable error
    pub fn transport_unavailable(message: impl Into<String>) -> Self {
        Self::TransportUnavailable {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new fallback error
    pub fn fallback(message: impl Into<String>) -> Self {
        Self::Fallback {
            message: message.into(),
        }
    }
}
