//! # Receipt Text Layout
//!
//! Deterministically renders a payment event plus the active ticket
//! configuration into fixed-width text lines sized to the configured
//! paper width (58mm -> 32 columns, 80mm -> 48 columns).
//!
//! Field inclusion is config-driven: client code, phone, address,
//! balance, overdue days and late fee each appear only when their flag is
//! on and the underlying value is present/non-zero. Centered lines pad
//! with `floor((width - len) / 2)` leading spaces; text at least as wide
//! as the paper is emitted unpadded and is deliberately never truncated.

use serde::{Deserialize, Serialize};

/// Columns on 58mm paper
pub const NARROW_COLUMNS: usize = 32;

/// Columns on 80mm paper
pub const WIDE_COLUMNS: usize = 48;

/// Ticket layout configuration, persisted as JSON under the `ticket`
/// config key. Unknown paper widths fall back to 58mm columns, unknown
/// font sizes to normal; both match the device's own defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TicketConfig {
    /// Paper width in millimeters: 58 or 80
    pub paper_width_mm: u8,
    /// `"small"` or `"large"`; anything else prints normal
    pub font_size: String,
    pub business_name: String,
    pub business_address: String,
    pub business_phone: String,
    pub title: String,
    pub footer: String,
    pub thank_you: String,
    pub show_client_code: bool,
    pub show_phone: bool,
    pub show_address: bool,
    pub show_balance: bool,
    pub show_overdue_days: bool,
    pub show_late_fee: bool,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            paper_width_mm: 58,
            font_size: "small".to_string(),
            business_name: String::new(),
            business_address: String::new(),
            business_phone: String::new(),
            title: "RECIBO DE PAGO".to_string(),
            footer: String::new(),
            thank_you: "GRACIAS POR SU PAGO".to_string(),
            show_client_code: true,
            show_phone: true,
            show_address: true,
            show_balance: true,
            show_overdue_days: true,
            show_late_fee: true,
        }
    }
}

impl TicketConfig {
    /// Line width in columns for the configured paper
    pub fn columns(&self) -> usize {
        if self.paper_width_mm == 80 {
            WIDE_COLUMNS
        } else {
            NARROW_COLUMNS
        }
    }
}

/// The payment event as the receipt sees it: the captured payment plus
/// the client fields the layout may print.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptData {
    pub client_code: String,
    pub client_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub amount: f64,
    pub balance: f64,
    pub overdue_days: i64,
    pub late_fee: f64,
    /// Capture timestamp, RFC3339
    pub captured_at: String,
    /// Local payment id, printed as the folio when present
    pub folio: Option<i64>,
}

impl ReceiptData {
    /// Assemble receipt data from a captured payment and, when the local
    /// snapshot has it, the client record.
    pub fn from_parts(
        payment: &crate::model::PaymentRecord,
        client: Option<&crate::model::ClientSnapshot>,
    ) -> Self {
        Self {
            client_code: payment.client_code.clone(),
            client_name: client.map(|c| c.name.clone()).unwrap_or_default(),
            phone: client.and_then(|c| c.phone.clone()),
            address: client.and_then(|c| c.address.clone()),
            amount: payment.amount,
            balance: client.map(|c| c.balance).unwrap_or(0.0),
            overdue_days: client.map(|c| c.overdue_days).unwrap_or(0),
            late_fee: client.map(|c| c.late_fee).unwrap_or(0.0),
            captured_at: payment.captured_at.clone(),
            folio: Some(payment.id),
        }
    }
}

/// Render the fixed-width receipt text.
pub fn render_text(data: &ReceiptData, config: &TicketConfig) -> String {
    let width = config.columns();
    let mut lines: Vec<String> = Vec::new();

    for header in [
        &config.business_name,
        &config.business_address,
        &config.business_phone,
    ] {
        if !header.is_empty() {
            lines.push(center(header, width));
        }
    }

    lines.push(separator(width));
    lines.push(center(&config.title, width));
    lines.push(separator(width));

    lines.push(kv("Fecha:", &format_date(&data.captured_at), width));
    if let Some(folio) = data.folio {
        lines.push(kv("Folio:", &folio.to_string(), width));
    }
    lines.push(kv("Cliente:", &data.client_name, width));
    if config.show_client_code && !data.client_code.is_empty() {
        lines.push(kv("Codigo:", &data.client_code, width));
    }
    if config.show_phone {
        if let Some(phone) = data.phone.as_deref().filter(|p| !p.is_empty()) {
            lines.push(kv("Telefono:", phone, width));
        }
    }
    if config.show_address {
        if let Some(address) = data.address.as_deref().filter(|a| !a.is_empty()) {
            lines.push(kv("Direccion:", address, width));
        }
    }

    lines.push(separator(width));
    lines.push(kv("Abono:", &money(data.amount), width));
    if config.show_balance && data.balance != 0.0 {
        lines.push(kv("Saldo:", &money(data.balance), width));
    }
    if config.show_overdue_days && data.overdue_days > 0 {
        lines.push(kv("Dias atraso:", &data.overdue_days.to_string(), width));
    }
    if config.show_late_fee && data.late_fee != 0.0 {
        lines.push(kv("Recargo:", &money(data.late_fee), width));
    }
    lines.push(separator(width));

    if !config.thank_you.is_empty() {
        lines.push(center(&config.thank_you, width));
    }
    if !config.footer.is_empty() {
        lines.push(center(&config.footer, width));
    }

    lines.join("\n")
}

/// Center `text` in `width` columns: `floor((width - len) / 2)` leading
/// spaces when it fits, the text unchanged (no truncation) when it does
/// not.
pub fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Label left, value right-aligned to the line width. An exactly-full
/// pair renders with zero padding; a pair that cannot fit wraps the
/// value onto its own line so only a single atomic field can ever
/// exceed the width (never truncated).
fn kv(label: &str, value: &str, width: usize) -> String {
    let label_len = label.chars().count();
    let value_len = value.chars().count();
    if label_len + value_len > width {
        return format!("{}\n{}", label, value);
    }
    format!("{}{}{}", label, " ".repeat(width - label_len - value_len), value)
}

fn separator(width: usize) -> String {
    "-".repeat(width)
}

fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Receipt-friendly date; falls back to the raw string when the stored
/// timestamp is not RFC3339.
fn format_date(captured_at: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(captured_at) {
        Ok(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
        Err(_) => captured_at.to_string(),
    }
}
