//! Data model for the field-collection core.
//!
//! One file per entity, mirroring the persisted collections: the read-only
//! client snapshot, payment records with their wire payload, sync-queue
//! items, and the ticket log.

pub mod client;
pub mod payment;
pub mod queue;
pub mod ticket;

pub use client::ClientSnapshot;
pub use payment::{NewPayment, PaymentPayload, PaymentRecord};
pub use queue::{QueueKind, SyncQueueItem};
pub use ticket::TicketLogEntry;
