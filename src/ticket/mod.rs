//! # Receipt Pipeline
//!
//! Renders payment receipts, logs them durably, and delivers them to a
//! wireless printer with a best-effort fallback. The ticket log entry is
//! written BEFORE any transport attempt: whatever happens to the radio,
//! the receipt text survives and can be reprinted.
//!
//! Delivery order per receipt:
//! 1. render fixed-width text from the payment plus ticket config
//! 2. append the text to the local ticket log
//! 3. encode to ESC/POS and push over the wireless link
//! 4. on any transport failure, present the text on the fallback surface
//! 5. mark the log entry printed only after a successful wireless send

pub mod escpos;
pub mod layout;

pub use layout::{ReceiptData, TicketConfig};

use tracing::{info, warn};

use crate::error::PrintError;
use crate::model::PaymentRecord;
use crate::print::{FallbackSurface, PrinterLink, WirelessPrinter};
use crate::store::LocalStore;

/// How a receipt ultimately reached the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    /// Sent to the printer; the log entry is marked printed
    Wireless { ticket_id: i64 },
    /// Transport missing or failed; text went to the fallback surface
    Fallback { ticket_id: i64 },
}

impl PrintOutcome {
    pub fn ticket_id(&self) -> i64 {
        match *self {
            Self::Wireless { ticket_id } | Self::Fallback { ticket_id } => ticket_id,
        }
    }
}

/// Drives the render/log/deliver pipeline for one device.
///
/// The wireless link is optional; without one every receipt goes
/// straight to the fallback surface but is still logged.
pub struct TicketPrinter<L, F> {
    store: LocalStore,
    printer: Option<WirelessPrinter<L>>,
    fallback: F,
}

impl<L: PrinterLink, F: FallbackSurface> TicketPrinter<L, F> {
    pub fn new(store: LocalStore, link: Option<L>, fallback: F) -> Self {
        Self {
            store,
            printer: link.map(WirelessPrinter::new),
            fallback,
        }
    }

    /// Print the receipt for a captured payment.
    ///
    /// Storage failures propagate; transport failures degrade to the
    /// fallback surface and only surface as an error when the fallback
    /// itself fails.
    pub async fn print_payment(
        &mut self,
        payment: &PaymentRecord,
    ) -> Result<PrintOutcome, PrintError> {
        let client = self.store.get_client(&payment.client_code).await?;
        let config = self.store.ticket_config().await?;
        let data = ReceiptData::from_parts(payment, client.as_ref());
        let text = layout::render_text(&data, &config);

        let ticket_id = self.store.append_ticket(&payment.client_code, &text).await?;
        self.deliver(ticket_id, &text, &config).await
    }

    /// Re-issue a logged receipt through the current transport.
    pub async fn reprint(&mut self, ticket_id: i64) -> Result<PrintOutcome, PrintError> {
        let ticket = self
            .store
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| crate::error::StoreError::not_found("tickets", ticket_id))?;
        let config = self.store.ticket_config().await?;
        self.deliver(ticket.id, &ticket.body, &config).await
    }

    async fn deliver(
        &mut self,
        ticket_id: i64,
        text: &str,
        config: &TicketConfig,
    ) -> Result<PrintOutcome, PrintError> {
        let transport_error = match self.printer.as_mut() {
            Some(printer) => {
                let job = escpos::encode(text, config);
                match printer.send(&job).await {
                    Ok(()) => {
                        self.store.mark_ticket_printed(ticket_id).await?;
                        info!(ticket_id, "receipt printed");
                        return Ok(PrintOutcome::Wireless { ticket_id });
                    }
                    Err(e) => e,
                }
            }
            None => PrintError::transport_unavailable("no printer link configured"),
        };

        warn!(ticket_id, error = %transport_error, "wireless print failed, using fallback");
        self.fallback.present(text)?;
        Ok(PrintOutcome::Fallback { ticket_id })
    }
}
