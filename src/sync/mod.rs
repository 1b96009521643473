//! # Sync Subsystem
//!
//! Everything between the local store and the server: the connectivity
//! monitor that observes online/offline transitions, the HTTP client for
//! the sync endpoints, the reconciler that drains the outbox with a
//! single-flight guard, and the scheduler that drives periodic drains
//! while the device is online.

pub mod api;
pub mod monitor;
pub mod reconciler;
pub mod scheduler;

pub use api::SyncApi;
pub use monitor::ConnectivityMonitor;
pub use reconciler::{DrainOutcome, Reconciler, SyncStatus};
pub use scheduler::SyncScheduler;
