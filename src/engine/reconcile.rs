//! Amount reconciliation of matched pairs
//!
//! Both amounts are rounded to two decimal places before the difference is
//! computed and the difference is rounded again afterwards; double-rounding
//! keeps binary floating-point noise in upstream exports from surfacing as
//! false mismatches.

use bigdecimal::BigDecimal;

use crate::types::{Amount, MatchedPair, ReconciledRecord};

/// Mismatch tolerance in currency units. Fixed: differences at or below one
/// cent reconcile, anything larger is flagged. Not caller-configurable.
pub fn amount_tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

/// Compute the difference fields for every matched pair.
///
/// A pair whose paid or settled amount failed numeric coercion is flagged
/// mismatched rather than failing the batch; one malformed row never aborts
/// a reconciliation run.
pub fn reconcile(pairs: Vec<MatchedPair>) -> Vec<ReconciledRecord> {
    pairs.into_iter().map(reconcile_pair).collect()
}

fn reconcile_pair(pair: MatchedPair) -> ReconciledRecord {
    let MatchedPair { order, settlement } = pair;

    let total_paid = order.total_paid.rounded();
    let settled_amount = settlement.amount.rounded();
    let amount_difference = total_paid.sub(&settled_amount).rounded();

    let is_mismatch = match amount_difference.as_value() {
        Some(difference) => difference.abs() > amount_tolerance(),
        None => true,
    };

    ReconciledRecord {
        order_id: order.order_id,
        amount_excl_vat: order.amount_excl_vat,
        vat_amount: order.vat_amount,
        unit_price_excl_vat: order.unit_price_excl_vat,
        vat_rate_pct: order.vat_rate_pct,
        order_time: order.order_time,
        total_paid,
        settled_amount,
        settlement_status: settlement.settlement_status,
        settlement_date: settlement.settlement_date,
        transaction_end_date: settlement.transaction_end_date,
        payment_transaction_ref: settlement.payment_transaction_ref,
        amount_difference,
        is_mismatch,
    }
}
