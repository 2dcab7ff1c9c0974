//! Inner join of normalized orders and settlements on the canonical order id

use std::collections::HashMap;

use crate::types::{MatchedPair, OrderRecord, SettlementRecord};

/// Join orders to settlements on the canonical order id.
///
/// Standard relational inner-join semantics: only keys present on both sides
/// survive, and duplicate keys produce the full cross-product of matching
/// rows. Output order is stable, following the order side first and the
/// settlement side within a key. An empty intersection yields an empty vec,
/// never an error.
///
/// Rows without a join partner are silently dropped; the engine produces no
/// unmatched-row report. That is a known limitation carried over from the
/// source system, not an error condition.
pub fn match_records(
    orders: &[OrderRecord],
    settlements: &[SettlementRecord],
) -> Vec<MatchedPair> {
    let mut by_order_id: HashMap<&str, Vec<&SettlementRecord>> = HashMap::new();
    for settlement in settlements {
        by_order_id
            .entry(settlement.order_id.as_str())
            .or_default()
            .push(settlement);
    }

    let mut pairs = Vec::new();
    for order in orders {
        if let Some(candidates) = by_order_id.get(order.order_id.as_str()) {
            for settlement in candidates {
                pairs.push(MatchedPair {
                    order: order.clone(),
                    settlement: (*settlement).clone(),
                });
            }
        }
    }
    pairs
}
