//! Wireless ESC/POS delivery over a connected [`PrinterLink`].
//!
//! Jobs are split into small chunks with a short inter-chunk pause;
//! budget thermal printers drop bytes when a full job arrives in one
//! write.

use std::time::Duration;

use tracing::debug;

use crate::error::PrintError;

use super::PrinterLink;

/// GATT service commonly exposed by portable ESC/POS printers
pub const PRINT_SERVICE_UUID: &str = "000018f0-0000-1000-8000-00805f9b34fb";

/// Write characteristic under [`PRINT_SERVICE_UUID`]
pub const PRINT_CHARACTERISTIC_UUID: &str = "00002af1-0000-1000-8000-00805f9b34fb";

/// Safe payload size for BLE writes without negotiated MTU
const CHUNK_SIZE: usize = 180;

/// Pause between chunks so the device's buffer keeps up
const CHUNK_DELAY: Duration = Duration::from_millis(20);

/// Chunked writer over any [`PrinterLink`].
#[derive(Debug)]
pub struct WirelessPrinter<L> {
    link: L,
}

impl<L: PrinterLink> WirelessPrinter<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Send a complete job, chunked. The first failed chunk aborts the
    /// job; partial output is acceptable, silent data loss is not. The
    /// inter-chunk pause yields to the runtime rather than blocking a
    /// worker thread.
    pub async fn send(&mut self, job: &[u8]) -> Result<(), PrintError> {
        let chunks = job.chunks(CHUNK_SIZE);
        let total = chunks.len();
        for (index, chunk) in chunks.enumerate() {
            self.link.write_all(chunk)?;
            if index + 1 < total {
                tokio::time::sleep(CHUNK_DELAY).await;
            }
        }
        debug!(bytes = job.len(), chunks = total, "print job sent");
        Ok(())
    }

    pub fn into_link(self) -> L {
        self.link
    }
}
