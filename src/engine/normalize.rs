//! Normalization of raw export rows into typed records
//!
//! The normalizer is the only stage that touches raw cells. It projects each
//! side onto the columns the engine needs, canonicalizes the join keys to
//! plain strings and derives the warehouse side's paid total. A required
//! column that is absent fails the invocation with a schema error; a cell
//! that merely fails to coerce degrades per the crate's coercion policy.

use bigdecimal::{BigDecimal, Zero};

use crate::types::{columns, Amount, OrderRecord, RawRow, ReconResult, SettlementRecord, Side};
use crate::utils::{parse_amount, parse_rate, parse_timestamp, require_cell, validate_order_id};

/// Payment-method marker selecting the rows this engine reconciles. Orders
/// paid any other way are excluded before matching. Not configurable.
pub const CHECKOUT_MARKER: &str = "QLIROCHECKOUT";

/// Warehouse-system token prefixed to order numbers in the settlement export.
pub const SETTLEMENT_ORDER_PREFIX: &str = "WGR";

/// Normalize warehouse order rows.
///
/// Rows whose payment method is not [`CHECKOUT_MARKER`] are dropped outright,
/// as are rows without a usable order id. The paid total is
/// `amount_excl_vat + vat_amount`, recomputed from the unit price and VAT
/// rate when that sum is exactly zero (rows whose totals were never populated
/// upstream).
pub fn normalize_orders(rows: &[RawRow]) -> ReconResult<Vec<OrderRecord>> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let payment_method = require_cell(row, columns::WGR_PAYMENT_METHOD, Side::Wgr)?;
        if payment_method.trim() != CHECKOUT_MARKER {
            continue;
        }

        let order_id = require_cell(row, columns::WGR_ORDER_ID, Side::Wgr)?.trim();
        let amount_excl_vat =
            parse_amount(require_cell(row, columns::WGR_AMOUNT_EXCL_VAT, Side::Wgr)?);
        let vat_amount = parse_amount(require_cell(row, columns::WGR_VAT_AMOUNT, Side::Wgr)?);
        let unit_price_excl_vat =
            parse_amount(require_cell(row, columns::WGR_UNIT_PRICE_EXCL_VAT, Side::Wgr)?);
        let vat_rate_pct = parse_rate(require_cell(row, columns::WGR_VAT_RATE_PCT, Side::Wgr)?);
        let order_time = parse_timestamp(require_cell(row, columns::WGR_ORDER_TIME, Side::Wgr)?);

        if !validate_order_id(order_id) {
            continue;
        }

        let total_paid = derive_total_paid(
            &amount_excl_vat,
            &vat_amount,
            &unit_price_excl_vat,
            vat_rate_pct.as_ref(),
        );

        records.push(OrderRecord {
            order_id: order_id.to_string(),
            amount_excl_vat,
            vat_amount,
            unit_price_excl_vat,
            vat_rate_pct,
            order_time,
            total_paid,
        });
    }

    Ok(records)
}

/// Normalize settlement rows, stripping [`SETTLEMENT_ORDER_PREFIX`] from the
/// order number so both sides join on the same key domain.
pub fn normalize_settlements(rows: &[RawRow]) -> ReconResult<Vec<SettlementRecord>> {
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        let raw_id = require_cell(row, columns::QLIRO_ORDER_ID, Side::Qliro)?.trim();
        let order_id = raw_id.strip_prefix(SETTLEMENT_ORDER_PREFIX).unwrap_or(raw_id);

        let amount = parse_amount(require_cell(row, columns::QLIRO_AMOUNT, Side::Qliro)?);
        let settlement_status =
            require_cell(row, columns::QLIRO_SETTLEMENT_STATUS, Side::Qliro)?.to_string();
        let settlement_date =
            parse_timestamp(require_cell(row, columns::QLIRO_SETTLEMENT_DATE, Side::Qliro)?);
        let transaction_end_date =
            parse_timestamp(require_cell(row, columns::QLIRO_TRANSACTION_END_DATE, Side::Qliro)?);
        let payment_transaction_ref =
            require_cell(row, columns::QLIRO_PAYMENT_TRANSACTION_REF, Side::Qliro)?.to_string();

        if !validate_order_id(order_id) {
            continue;
        }

        records.push(SettlementRecord {
            order_id: order_id.to_string(),
            amount,
            settlement_status,
            settlement_date,
            transaction_end_date,
            payment_transaction_ref,
        });
    }

    Ok(records)
}

/// Paid-total derivation with the zero fallback.
///
/// The fallback only fires when the primary sum is a valid, exact zero; an
/// invalid component keeps the total invalid rather than guessing.
fn derive_total_paid(
    amount_excl_vat: &Amount,
    vat_amount: &Amount,
    unit_price_excl_vat: &Amount,
    vat_rate_pct: Option<&BigDecimal>,
) -> Amount {
    let primary = match (amount_excl_vat.as_value(), vat_amount.as_value()) {
        (Some(net), Some(vat)) => net + vat,
        _ => return Amount::Invalid,
    };

    if !primary.is_zero() {
        return Amount::Value(primary);
    }

    match (unit_price_excl_vat.as_value(), vat_rate_pct) {
        (Some(unit_price), Some(rate)) => {
            let gross = unit_price * (BigDecimal::from(100) + rate) / BigDecimal::from(100);
            Amount::Value(gross)
        }
        _ => Amount::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReconError;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn wgr_row(
        order_id: &str,
        amount_excl_vat: &str,
        vat_amount: &str,
        unit_price: &str,
        vat_rate: &str,
        order_time: &str,
        payment_method: &str,
    ) -> RawRow {
        let mut row = HashMap::new();
        row.insert(columns::WGR_ORDER_ID.to_string(), order_id.to_string());
        row.insert(
            columns::WGR_AMOUNT_EXCL_VAT.to_string(),
            amount_excl_vat.to_string(),
        );
        row.insert(columns::WGR_VAT_AMOUNT.to_string(), vat_amount.to_string());
        row.insert(
            columns::WGR_UNIT_PRICE_EXCL_VAT.to_string(),
            unit_price.to_string(),
        );
        row.insert(columns::WGR_VAT_RATE_PCT.to_string(), vat_rate.to_string());
        row.insert(columns::WGR_ORDER_TIME.to_string(), order_time.to_string());
        row.insert(
            columns::WGR_PAYMENT_METHOD.to_string(),
            payment_method.to_string(),
        );
        row
    }

    fn qliro_row(order_id: &str, amount: &str, settlement_date: &str) -> RawRow {
        let mut row = HashMap::new();
        row.insert(columns::QLIRO_ORDER_ID.to_string(), order_id.to_string());
        row.insert(columns::QLIRO_AMOUNT.to_string(), amount.to_string());
        row.insert(
            columns::QLIRO_SETTLEMENT_STATUS.to_string(),
            "Utbetald".to_string(),
        );
        row.insert(
            columns::QLIRO_SETTLEMENT_DATE.to_string(),
            settlement_date.to_string(),
        );
        row.insert(
            columns::QLIRO_TRANSACTION_END_DATE.to_string(),
            settlement_date.to_string(),
        );
        row.insert(
            columns::QLIRO_PAYMENT_TRANSACTION_REF.to_string(),
            "ref-1".to_string(),
        );
        row
    }

    #[test]
    fn test_non_checkout_rows_are_filtered_out() {
        let rows = vec![
            wgr_row("1001", "80", "20", "0", "25", "2024-03-05", CHECKOUT_MARKER),
            wgr_row("1002", "80", "20", "0", "25", "2024-03-05", "INVOICE"),
        ];
        let records = normalize_orders(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].order_id, "1001");
    }

    #[test]
    fn test_paid_total_is_net_plus_vat() {
        let rows = vec![wgr_row(
            "1001",
            "80.00",
            "20.00",
            "0",
            "25",
            "2024-03-05",
            CHECKOUT_MARKER,
        )];
        let records = normalize_orders(&rows).unwrap();
        assert_eq!(
            records[0].total_paid,
            Amount::Value(BigDecimal::from_str("100.00").unwrap())
        );
    }

    #[test]
    fn test_zero_total_falls_back_to_unit_price_times_rate() {
        let rows = vec![wgr_row(
            "1001",
            "0",
            "0",
            "80.00",
            "25",
            "2024-03-05",
            CHECKOUT_MARKER,
        )];
        let records = normalize_orders(&rows).unwrap();
        let total = records[0].total_paid.as_value().unwrap();
        assert_eq!(total, &BigDecimal::from(100));
    }

    #[test]
    fn test_invalid_component_keeps_total_invalid() {
        let rows = vec![wgr_row(
            "1001",
            "not-a-number",
            "20.00",
            "80.00",
            "25",
            "2024-03-05",
            CHECKOUT_MARKER,
        )];
        let records = normalize_orders(&rows).unwrap();
        assert!(records[0].total_paid.is_invalid());
    }

    #[test]
    fn test_missing_column_is_a_schema_error() {
        let mut row = wgr_row("1001", "80", "20", "0", "25", "2024-03-05", CHECKOUT_MARKER);
        row.remove(columns::WGR_VAT_AMOUNT);
        let err = normalize_orders(&[row]).unwrap_err();
        match err {
            ReconError::Schema { side, column } => {
                assert_eq!(side, Side::Wgr);
                assert_eq!(column, columns::WGR_VAT_AMOUNT);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_settlement_order_id_loses_warehouse_prefix() {
        let rows = vec![qliro_row("WGR1001", "100.00", "2024-03-10")];
        let records = normalize_settlements(&rows).unwrap();
        assert_eq!(records[0].order_id, "1001");
    }

    #[test]
    fn test_unprefixed_settlement_id_passes_through() {
        let rows = vec![qliro_row("1002", "50.00", "2024-03-10")];
        let records = normalize_settlements(&rows).unwrap();
        assert_eq!(records[0].order_id, "1002");
    }
}
