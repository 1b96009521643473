//! Cobrador - Offline-First Field Collection Core
//!
//! Cobrador is the embeddable core of a field payment-collection app:
//! collectors capture client payments on a handheld device that is
//! offline most of the day, and the crate guarantees that every capture
//! survives locally, reaches the server exactly once when connectivity
//! returns, and produces a printable receipt on the spot.
//!
//! # Overview
//!
//! The crate provides:
//! - A SQLite-backed local record store for clients, payments, tickets
//!   and configuration
//! - A durable sync queue with a reconciler that drains it to the
//!   server with retry backoff
//! - A connectivity monitor and background scheduler that trigger
//!   drains on reconnect and on a periodic timer
//! - A receipt pipeline that renders fixed-width ticket text, logs it,
//!   and delivers it over a wireless ESC/POS printer with an on-disk
//!   fallback
//!
//! # Module Structure
//!
//! - **`store`** - the local SQLite store and all persistence
//! - **`model`** - record types shared across the crate
//! - **`sync`** - server API client, connectivity monitor, reconciler
//!   and scheduler
//! - **`ticket`** - receipt layout, ESC/POS encoding and the print
//!   pipeline
//! - **`print`** - printer transport traits, the wireless link driver
//!   and the spool fallback
//! - **`config`** - runtime configuration from file and environment
//! - **`error`** - per-subsystem error types
//!
//! # Usage
//!
//! ```rust,no_run
//! use cobrador::config::Config;
//! use cobrador::store::LocalStore;
//! use cobrador::sync::{ConnectivityMonitor, Reconciler, SyncApi, SyncScheduler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new();
//! let store = LocalStore::open(config.db_path()).await?;
//! let monitor = ConnectivityMonitor::new();
//! let api = SyncApi::new(config.clone())?;
//! let reconciler = Reconciler::new(store.clone(), api, monitor.clone());
//!
//! let _scheduler = SyncScheduler::start(reconciler, monitor.clone(), config.sync_interval());
//!
//! // The platform's network callbacks drive the monitor:
//! monitor.set_online();
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! `LocalStore` and `ConnectivityMonitor` are cheap to clone and safe
//! to share across tasks. The reconciler is shared behind an `Arc` and
//! serializes its own drain passes, so overlapping triggers collapse
//! into a single pass.

pub mod config;
pub mod error;
pub mod model;
pub mod print;
pub mod store;
pub mod sync;
pub mod ticket;

pub use config::Config;
pub use error::{PrintError, StoreError, SyncError};
pub use model::{ClientSnapshot, NewPayment, PaymentRecord, SyncQueueItem, TicketLogEntry};
pub use store::LocalStore;
pub use sync::{ConnectivityMonitor, DrainOutcome, Reconciler, SyncApi, SyncScheduler};
pub use ticket::{PrintOutcome, TicketConfig, TicketPrinter};
