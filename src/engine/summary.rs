//! Aggregate totals per VAT rate

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ReconciledRecord, AMOUNT_SCALE};

/// One summary row: sums for every reconciled record sharing a VAT rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatSummaryRow {
    /// Grouping key. `None` collects records without a usable rate; they are
    /// kept visible rather than dropped from the summary.
    pub vat_rate_pct: Option<BigDecimal>,
    /// Sum of paid totals, two decimal places.
    pub total_paid: BigDecimal,
    /// Sum of settled amounts, two decimal places.
    pub settled_amount: BigDecimal,
    /// Sum of signed differences, two decimal places.
    pub amount_difference: BigDecimal,
}

/// Aggregate table keyed by VAT rate.
///
/// Rows are ordered by ascending rate with the missing-rate group first.
/// Invalid amounts contribute nothing to the sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatSummary {
    pub rows: Vec<VatSummaryRow>,
}

#[derive(Default)]
struct RateTotals {
    total_paid: BigDecimal,
    settled_amount: BigDecimal,
    amount_difference: BigDecimal,
}

impl VatSummary {
    /// Summarize any group of reconciled records. The shell calls this per
    /// period bucket; the engine precomputes it for the all-matched group.
    pub fn for_records(records: &[ReconciledRecord]) -> Self {
        // BigDecimal's numeric Ord collapses 25 and 25.00 into one group.
        let mut groups: BTreeMap<Option<BigDecimal>, RateTotals> = BTreeMap::new();

        for record in records {
            let totals = groups.entry(record.vat_rate_pct.clone()).or_default();
            if let Some(paid) = record.total_paid.as_value() {
                totals.total_paid += paid;
            }
            if let Some(settled) = record.settled_amount.as_value() {
                totals.settled_amount += settled;
            }
            if let Some(difference) = record.amount_difference.as_value() {
                totals.amount_difference += difference;
            }
        }

        let rows = groups
            .into_iter()
            .map(|(vat_rate_pct, totals)| VatSummaryRow {
                vat_rate_pct,
                total_paid: totals
                    .total_paid
                    .with_scale_round(AMOUNT_SCALE, RoundingMode::HalfEven),
                settled_amount: totals
                    .settled_amount
                    .with_scale_round(AMOUNT_SCALE, RoundingMode::HalfEven),
                amount_difference: totals
                    .amount_difference
                    .with_scale_round(AMOUNT_SCALE, RoundingMode::HalfEven),
            })
            .collect();

        Self { rows }
    }

    /// Sum of signed differences across all rows.
    pub fn total_difference(&self) -> BigDecimal {
        self.rows.iter().map(|row| &row.amount_difference).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Amount;
    use std::str::FromStr;

    fn record(rate: Option<&str>, paid: &str, settled: &str, diff: &str) -> ReconciledRecord {
        ReconciledRecord {
            order_id: "1001".to_string(),
            amount_excl_vat: Amount::Invalid,
            vat_amount: Amount::Invalid,
            unit_price_excl_vat: Amount::Invalid,
            vat_rate_pct: rate.map(|r| BigDecimal::from_str(r).unwrap()),
            order_time: None,
            total_paid: Amount::parse(paid),
            settled_amount: Amount::parse(settled),
            settlement_status: String::new(),
            settlement_date: None,
            transaction_end_date: None,
            payment_transaction_ref: String::new(),
            amount_difference: Amount::parse(diff),
            is_mismatch: false,
        }
    }

    #[test]
    fn test_groups_by_rate_with_missing_rates_kept() {
        let records = vec![
            record(Some("25"), "100.00", "100.00", "0.00"),
            record(Some("25.00"), "50.00", "45.00", "5.00"),
            record(Some("12"), "30.00", "30.00", "0.00"),
            record(None, "10.00", "10.00", "0.00"),
        ];

        let summary = VatSummary::for_records(&records);
        assert_eq!(summary.rows.len(), 3);

        // Missing-rate group first, then ascending rate.
        assert_eq!(summary.rows[0].vat_rate_pct, None);
        assert_eq!(summary.rows[1].vat_rate_pct, Some(BigDecimal::from(12)));
        assert_eq!(summary.rows[2].vat_rate_pct, Some(BigDecimal::from(25)));

        // 25 and 25.00 collapsed into one group.
        assert_eq!(
            summary.rows[2].total_paid,
            BigDecimal::from_str("150.00").unwrap()
        );
        assert_eq!(
            summary.rows[2].amount_difference,
            BigDecimal::from_str("5.00").unwrap()
        );
    }

    #[test]
    fn test_invalid_amounts_do_not_poison_sums() {
        let records = vec![
            record(Some("25"), "100.00", "100.00", "0.00"),
            record(Some("25"), "junk", "100.00", "junk"),
        ];
        let summary = VatSummary::for_records(&records);
        assert_eq!(
            summary.rows[0].total_paid,
            BigDecimal::from_str("100.00").unwrap()
        );
        assert_eq!(
            summary.rows[0].settled_amount,
            BigDecimal::from_str("200.00").unwrap()
        );
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        let summary = VatSummary::for_records(&[]);
        assert!(summary.rows.is_empty());
        assert_eq!(summary.total_difference(), BigDecimal::from(0));
    }
}
