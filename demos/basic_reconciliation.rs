//! Basic reconciliation walk-through

use chrono::NaiveDate;
use std::collections::HashMap;

use reconciliation_core::engine::CHECKOUT_MARKER;
use reconciliation_core::{
    columns, DateField, RawRow, ReconciliationEngine, ReconciliationParams, ReportingPeriod,
    VatSummary,
};

fn wgr_row(order_id: &str, net: &str, vat: &str, order_time: &str) -> RawRow {
    let mut row = HashMap::new();
    row.insert(columns::WGR_ORDER_ID.to_string(), order_id.to_string());
    row.insert(columns::WGR_AMOUNT_EXCL_VAT.to_string(), net.to_string());
    row.insert(columns::WGR_VAT_AMOUNT.to_string(), vat.to_string());
    row.insert(columns::WGR_UNIT_PRICE_EXCL_VAT.to_string(), "0".to_string());
    row.insert(columns::WGR_VAT_RATE_PCT.to_string(), "25".to_string());
    row.insert(columns::WGR_ORDER_TIME.to_string(), order_time.to_string());
    row.insert(
        columns::WGR_PAYMENT_METHOD.to_string(),
        CHECKOUT_MARKER.to_string(),
    );
    row
}

fn qliro_row(order_id: &str, amount: &str, settled_on: &str) -> RawRow {
    let mut row = HashMap::new();
    row.insert(columns::QLIRO_ORDER_ID.to_string(), order_id.to_string());
    row.insert(columns::QLIRO_AMOUNT.to_string(), amount.to_string());
    row.insert(
        columns::QLIRO_SETTLEMENT_STATUS.to_string(),
        "Utbetald".to_string(),
    );
    row.insert(
        columns::QLIRO_SETTLEMENT_DATE.to_string(),
        settled_on.to_string(),
    );
    row.insert(
        columns::QLIRO_TRANSACTION_END_DATE.to_string(),
        settled_on.to_string(),
    );
    row.insert(
        columns::QLIRO_PAYMENT_TRANSACTION_REF.to_string(),
        format!("ref-{order_id}"),
    );
    row
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Reconciliation Core - Basic Example\n");

    // Two small ledgers covering the same orders. Order 1002 settles short,
    // order 1003 settles after the reporting period.
    let wgr = vec![
        wgr_row("1001", "80.00", "20.00", "2024-03-05"),
        wgr_row("1002", "40.00", "10.00", "2024-03-12"),
        wgr_row("1003", "16.00", "4.00", "2024-03-28"),
    ];
    let qliro = vec![
        qliro_row("WGR1001", "100.00", "2024-03-10"),
        qliro_row("WGR1002", "45.00", "2024-03-15"),
        qliro_row("WGR1003", "20.00", "2024-04-03"),
    ];

    let params = ReconciliationParams {
        period: ReportingPeriod::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("bad date")?,
            NaiveDate::from_ymd_opt(2024, 3, 31).ok_or("bad date")?,
        )?,
        date_field: DateField::SettlementDate,
    };

    let report = ReconciliationEngine::new().run(&wgr, &qliro, &params)?;

    println!("📊 Matched {} orders", report.results.all_matched.len());
    if let Some((first, last)) = report.date_span {
        println!("  first settlement: {first}");
        println!("  last settlement:  {last}\n");
    }

    for record in &report.results.all_matched {
        let marker = if record.is_mismatch { "✗" } else { "✓" };
        println!(
            "  {} order {}: paid {:?}, settled {:?}, difference {:?}",
            marker,
            record.order_id,
            record.total_paid,
            record.settled_amount,
            record.amount_difference,
        );
    }

    println!("\n⏱ In period: {}", report.results.in_period.len());
    println!("⏱ Ahead of period: {}", report.results.ahead_of_period.len());

    println!("\n💶 VAT summary (all matched):");
    for row in &report.vat_summary.rows {
        println!(
            "  rate {:?}: paid {}, settled {}, difference {}",
            row.vat_rate_pct, row.total_paid, row.settled_amount, row.amount_difference
        );
    }

    println!("\n💶 VAT summary (in period only):");
    for row in VatSummary::for_records(&report.results.in_period).rows {
        println!(
            "  rate {:?}: paid {}, settled {}, difference {}",
            row.vat_rate_pct, row.total_paid, row.settled_amount, row.amount_difference
        );
    }

    Ok(())
}
