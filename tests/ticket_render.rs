//! Receipt layout properties across paper widths and configurations.

use cobrador::ticket::layout::{center, render_text, ReceiptData, TicketConfig};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn receipt() -> ReceiptData {
    ReceiptData {
        client_code: "C-001".to_string(),
        client_name: "MARIA LOPEZ".to_string(),
        phone: Some("555-0101".to_string()),
        address: Some("AV. JUAREZ 10".to_string()),
        amount: 250.0,
        balance: 1200.0,
        overdue_days: 15,
        late_fee: 30.0,
        captured_at: "2026-08-30T09:30:00+00:00".to_string(),
        folio: Some(42),
    }
}

#[test]
fn test_business_name_centering_on_narrow_paper() {
    let mut config = TicketConfig::default();
    config.business_name = "MI NEGOCIO".to_string();

    let text = render_text(&receipt(), &config);
    let first = text.lines().next().unwrap();

    // 10 chars in 32 columns: floor(22 / 2) = 11 leading spaces
    assert_eq!(first, "           MI NEGOCIO");
}

#[test]
fn test_narrow_and_wide_papers_use_their_column_counts() {
    let narrow = TicketConfig::default();
    assert_eq!(narrow.columns(), 32);

    let mut wide = TicketConfig::default();
    wide.paper_width_mm = 80;
    assert_eq!(wide.columns(), 48);

    let narrow_text = render_text(&receipt(), &narrow);
    let wide_text = render_text(&receipt(), &wide);
    assert!(narrow_text.lines().all(|l| l.chars().count() <= 32));
    assert!(wide_text.lines().all(|l| l.chars().count() <= 48));
}

#[test]
fn test_exactly_full_client_line_stays_within_width() {
    // "Cliente:" (8 chars) plus a 24-char name fills 58mm paper exactly
    let mut data = receipt();
    data.client_name = "X".repeat(24);

    let text = render_text(&data, &TicketConfig::default());
    let line = text.lines().find(|l| l.starts_with("Cliente:")).unwrap();
    assert_eq!(line.chars().count(), 32);
    for line in text.lines() {
        assert!(line.chars().count() <= 32, "line is {} chars: {:?}", line.chars().count(), line);
    }
}

#[test]
fn test_receipt_contains_the_money_lines() {
    let text = render_text(&receipt(), &TicketConfig::default());
    assert!(text.contains("$250.00"));
    assert!(text.contains("$1200.00"));
    assert!(text.contains("30/08/2026 09:30"));
}

#[test]
fn test_disabled_fields_never_appear() {
    let mut config = TicketConfig::default();
    config.show_client_code = false;
    config.show_phone = false;
    config.show_address = false;
    config.show_balance = false;
    config.show_overdue_days = false;
    config.show_late_fee = false;

    let text = render_text(&receipt(), &config);
    for label in ["Codigo:", "Telefono:", "Direccion:", "Saldo:", "Dias atraso:", "Recargo:"] {
        assert!(!text.contains(label), "{} should be suppressed", label);
    }
    // The payment amount itself always prints
    assert!(text.contains("Abono:"));
}

proptest! {
    /// Centering never truncates, never overflows when the input fits,
    /// and pads by exactly floor((width - len) / 2).
    #[test]
    fn prop_centering(text in "[A-Za-z0-9 ]{0,60}", width in 1usize..80) {
        let centered = center(&text, width);
        prop_assert!(centered.ends_with(&text));

        let len = text.chars().count();
        if len >= width {
            prop_assert_eq!(&centered, &text);
        } else {
            let pad = centered.chars().count() - len;
            prop_assert_eq!(pad, (width - len) / 2);
            prop_assert!(centered.chars().count() <= width);
        }
    }

    /// Every rendered line fits the configured paper; the only allowed
    /// exception is a single atomic field whose own text is wider than
    /// the paper (it wraps onto its own line, never truncated).
    #[test]
    fn prop_lines_fit_paper(name in "[A-Z][A-Z ]{0,39}", amount in 0.0f64..100_000.0) {
        let mut data = receipt();
        data.client_name = name.clone();
        data.amount = amount;

        let config = TicketConfig::default();
        let text = render_text(&data, &config);
        for line in text.lines() {
            prop_assert!(
                line.chars().count() <= config.columns() || line == name,
                "over-width line is not an atomic field: {:?}",
                line
            );
        }
    }
}
