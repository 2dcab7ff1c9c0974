//! Core types and data structures for the reconciliation engine

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A raw input row as delivered by the ingestion shell: column name to cell
/// text. Parsing of the delimited files themselves happens outside the core.
pub type RawRow = HashMap<String, String>;

/// Column headers of the two export formats.
///
/// The warehouse export carries English headers, the settlement export the
/// provider's Swedish ones. These are the names the normalizer looks up in
/// each [`RawRow`].
pub mod columns {
    /// WGR: order identifier, the join key.
    pub const WGR_ORDER_ID: &str = "Order ID";
    /// WGR: order total excluding VAT.
    pub const WGR_AMOUNT_EXCL_VAT: &str = "Total amount excl. VAT";
    /// WGR: order VAT total.
    pub const WGR_VAT_AMOUNT: &str = "Total VAT";
    /// WGR: unit price excluding VAT (fallback input).
    pub const WGR_UNIT_PRICE_EXCL_VAT: &str = "Price excl. VAT";
    /// WGR: average VAT rate in percent, the summary grouping key.
    pub const WGR_VAT_RATE_PCT: &str = "Average VAT rate (%)";
    /// WGR: order placement time.
    pub const WGR_ORDER_TIME: &str = "Order time";
    /// WGR: payment method marker; only checkout-provider rows reconcile.
    pub const WGR_PAYMENT_METHOD: &str = "Payment method";

    /// QLIRO: store order number, prefixed with the warehouse system token.
    pub const QLIRO_ORDER_ID: &str = "Butiksordernummer";
    /// QLIRO: settled amount.
    pub const QLIRO_AMOUNT: &str = "Belopp";
    /// QLIRO: settlement status, passed through.
    pub const QLIRO_SETTLEMENT_STATUS: &str = "Avräkningsstatus";
    /// QLIRO: settlement date.
    pub const QLIRO_SETTLEMENT_DATE: &str = "Avräkningsdatum";
    /// QLIRO: transaction end date, passed through.
    pub const QLIRO_TRANSACTION_END_DATE: &str = "Transaktionsslutdatum";
    /// QLIRO: payment transaction reference, passed through.
    pub const QLIRO_PAYMENT_TRANSACTION_REF: &str = "Betalning transaktionsreferens";
}

/// Which input ledger a value or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The warehouse/order-management export.
    Wgr,
    /// The payment-settlement provider export.
    Qliro,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Wgr => write!(f, "WGR"),
            Side::Qliro => write!(f, "QLIRO"),
        }
    }
}

/// Decimal scale every reconciled amount is rounded to.
pub const AMOUNT_SCALE: i64 = 2;

/// A monetary quantity that either carried a parseable number or failed
/// coercion.
///
/// Non-numeric cells degrade to [`Amount::Invalid`] instead of aborting the
/// batch; any comparison involving an invalid value classifies as a mismatch
/// downstream. An invalid amount is never treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Amount {
    /// A successfully coerced decimal value.
    Value(BigDecimal),
    /// A cell that could not be coerced to a number.
    Invalid,
}

impl Amount {
    /// Coerce raw cell text to an amount. Blank or non-numeric text yields
    /// [`Amount::Invalid`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<BigDecimal>() {
            Ok(value) => Amount::Value(value),
            Err(_) => Amount::Invalid,
        }
    }

    /// The contained value, if any.
    pub fn as_value(&self) -> Option<&BigDecimal> {
        match self {
            Amount::Value(value) => Some(value),
            Amount::Invalid => None,
        }
    }

    /// Whether coercion failed for this amount.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Amount::Invalid)
    }

    /// Round to [`AMOUNT_SCALE`] decimal places, half-even. Invalid stays
    /// invalid.
    pub fn rounded(&self) -> Self {
        match self {
            Amount::Value(value) => {
                Amount::Value(value.with_scale_round(AMOUNT_SCALE, RoundingMode::HalfEven))
            }
            Amount::Invalid => Amount::Invalid,
        }
    }

    /// Signed difference `self - other`. Invalid on either side propagates.
    pub fn sub(&self, other: &Amount) -> Self {
        match (self, other) {
            (Amount::Value(lhs), Amount::Value(rhs)) => Amount::Value(lhs - rhs),
            _ => Amount::Invalid,
        }
    }
}

impl From<BigDecimal> for Amount {
    fn from(value: BigDecimal) -> Self {
        Amount::Value(value)
    }
}

/// One normalized warehouse order line.
///
/// Only rows whose payment method equals the checkout-provider marker make it
/// this far; everything else is filtered out by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Canonical join key.
    pub order_id: String,
    /// Order total excluding VAT.
    pub amount_excl_vat: Amount,
    /// Order VAT total.
    pub vat_amount: Amount,
    /// Unit price excluding VAT.
    pub unit_price_excl_vat: Amount,
    /// Average VAT rate in percent; absent rates are preserved as `None`.
    pub vat_rate_pct: Option<BigDecimal>,
    /// Order placement time, if parseable.
    pub order_time: Option<NaiveDateTime>,
    /// Derived paid total: `amount_excl_vat + vat_amount`, or the unit-price
    /// fallback when that sum is exactly zero.
    pub total_paid: Amount,
}

/// One normalized settlement transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Canonical join key, warehouse prefix already stripped.
    pub order_id: String,
    /// Settled amount.
    pub amount: Amount,
    /// Settlement status, informational pass-through.
    pub settlement_status: String,
    /// Settlement date, if parseable.
    pub settlement_date: Option<NaiveDateTime>,
    /// Transaction end date, if parseable.
    pub transaction_end_date: Option<NaiveDateTime>,
    /// Opaque payment transaction reference, pass-through.
    pub payment_transaction_ref: String,
}

/// One order joined to one settlement on the canonical order id, before the
/// reconciler has computed the difference fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub order: OrderRecord,
    pub settlement: SettlementRecord,
}

/// A fully reconciled order/settlement pair.
///
/// Carries every field from both sides minus the duplicate join key, plus the
/// rounded amounts and the mismatch verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    pub order_id: String,
    pub amount_excl_vat: Amount,
    pub vat_amount: Amount,
    pub unit_price_excl_vat: Amount,
    pub vat_rate_pct: Option<BigDecimal>,
    pub order_time: Option<NaiveDateTime>,
    /// Paid total rounded to [`AMOUNT_SCALE`] decimal places.
    pub total_paid: Amount,
    /// Settled amount rounded to [`AMOUNT_SCALE`] decimal places.
    pub settled_amount: Amount,
    pub settlement_status: String,
    pub settlement_date: Option<NaiveDateTime>,
    pub transaction_end_date: Option<NaiveDateTime>,
    pub payment_transaction_ref: String,
    /// `total_paid - settled_amount`, rounded again after the subtraction.
    /// Invalid when either source amount failed coercion.
    pub amount_difference: Amount,
    /// True when the absolute difference exceeds the fixed tolerance, or when
    /// either amount is invalid.
    pub is_mismatch: bool,
}

impl ReconciledRecord {
    /// The timestamp driving period classification for the given selector.
    pub fn date_value(&self, field: DateField) -> Option<NaiveDateTime> {
        match field {
            DateField::SettlementDate => self.settlement_date,
            DateField::OrderTime => self.order_time,
        }
    }
}

/// Which timestamp field drives period classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateField {
    /// Classify on the settlement date.
    SettlementDate,
    /// Classify on the order placement time.
    OrderTime,
}

/// An inclusive calendar date range. Both bounds compare at start of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportingPeriod {
    /// Create a period, rejecting ranges where `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> ReconResult<Self> {
        if start > end {
            return Err(ReconError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Lower bound at 00:00:00.
    pub fn start_bound(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// Upper bound at 00:00:00. A timestamp later on the end date itself is
    /// already past the period.
    pub fn end_bound(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN)
    }

    /// Whether a timestamp falls inside the inclusive bounds.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start_bound() && ts <= self.end_bound()
    }
}

/// Matched records grouped by period bucket.
///
/// `before_period`, `in_period` and `ahead_of_period` partition the records of
/// `all_matched` whose selected date was present; records with a missing or
/// unparseable date stay in `all_matched` only. Unmatched rows from either
/// input never reach a result set, a known limitation of the engine (see
/// [`crate::engine::matching::match_records`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Every reconciled record, no temporal filter.
    pub all_matched: Vec<ReconciledRecord>,
    /// Records strictly before the period start.
    pub before_period: Vec<ReconciledRecord>,
    /// Records within the inclusive period bounds.
    pub in_period: Vec<ReconciledRecord>,
    /// Records strictly after the period end.
    pub ahead_of_period: Vec<ReconciledRecord>,
}

impl ResultSet {
    /// True when nothing matched at all.
    pub fn is_empty(&self) -> bool {
        self.all_matched.is_empty()
    }

    /// Earliest and latest value of the selected date field across all
    /// matched records, ignoring records where it is absent.
    pub fn date_span(&self, field: DateField) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut dates = self
            .all_matched
            .iter()
            .filter_map(|record| record.date_value(field));
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(min, max), ts| (min.min(ts), max.max(ts)));
        Some((min, max))
    }
}

/// Errors that can occur during reconciliation
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// A required column is absent from an input dataset.
    #[error("{side} dataset is missing required column '{column}'")]
    Schema { side: Side, column: String },
    /// The reporting period start is after its end.
    #[error("invalid reporting period: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_coerces_bad_cells_to_invalid() {
        assert_eq!(
            Amount::parse("100.50"),
            Amount::Value(BigDecimal::from_str("100.50").unwrap())
        );
        assert_eq!(Amount::parse(" 42 "), Amount::Value(BigDecimal::from(42)));
        assert_eq!(Amount::parse(""), Amount::Invalid);
        assert_eq!(Amount::parse("N/A"), Amount::Invalid);
    }

    #[test]
    fn test_invalid_propagates_through_subtraction() {
        let value = Amount::Value(BigDecimal::from(10));
        assert_eq!(value.sub(&Amount::Invalid), Amount::Invalid);
        assert_eq!(Amount::Invalid.sub(&value), Amount::Invalid);
        assert_eq!(
            value.sub(&Amount::Value(BigDecimal::from(4))),
            Amount::Value(BigDecimal::from(6))
        );
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let once = Amount::parse("100.005").rounded();
        assert_eq!(once, once.rounded());
    }

    #[test]
    fn test_period_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = ReportingPeriod::new(start, end).unwrap_err();
        assert!(matches!(err, ReconError::InvalidRange { .. }));
    }

    #[test]
    fn test_period_bounds_are_start_of_day_inclusive() {
        let period = ReportingPeriod::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();

        assert!(period.contains(period.start_bound()));
        assert!(period.contains(period.end_bound()));
        // Later the same day as the end bound is already outside.
        let end_noon = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(!period.contains(end_noon));
    }
}
