//! # Print Transports
//!
//! The ticket printer talks to hardware through the [`PrinterLink`]
//! trait so the delivery path stays testable without a radio in the
//! loop. [`WirelessPrinter`] chunks ESC/POS jobs over a connected link;
//! [`SpoolFallback`] preserves the rendered text on disk when no
//! transport is reachable, keeping capture-and-hand-write workflows
//! alive.

pub mod fallback;
pub mod wireless;

pub use fallback::SpoolFallback;
pub use wireless::WirelessPrinter;

use crate::error::PrintError;

/// A connected, writable printer transport. Implementations hold an
/// already-established connection; discovery and pairing live outside
/// this crate.
pub trait PrinterLink {
    /// Push raw job bytes to the device, blocking until the transport
    /// has accepted them all.
    fn write_all(&mut self, payload: &[u8]) -> Result<(), PrintError>;
}

/// Somewhere to surface receipt text when no printer transport is
/// available.
pub trait FallbackSurface {
    fn present(&mut self, text: &str) -> Result<(), PrintError>;
}
