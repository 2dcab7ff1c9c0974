//! Cell coercion helpers
//!
//! Raw cells arrive as text. Amounts coerce through [`Amount::parse`]; the
//! helpers here cover timestamps and VAT rates. Coercion never fails the
//! batch: unusable cells become `None` / [`Amount::Invalid`] and are judged
//! downstream.

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::types::Amount;

/// Timestamp layouts accepted from the exports, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell. Date-only values land at start of day; anything
/// unparseable is `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Parse a VAT rate cell. Rates group summary rows, so a bad cell maps to
/// `None` and joins the missing-rate group instead of vanishing.
pub fn parse_rate(raw: &str) -> Option<BigDecimal> {
    raw.trim().parse::<BigDecimal>().ok()
}

/// Coerce an amount cell, shorthand for [`Amount::parse`].
pub fn parse_amount(raw: &str) -> Amount {
    Amount::parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_date_and_datetime_layouts() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_timestamp("2024-03-05"), Some(midnight));

        let with_time = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 12)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-05 14:30:12"), Some(with_time));
        assert_eq!(parse_timestamp("2024-03-05T14:30:12"), Some(with_time));
    }

    #[test]
    fn test_bad_timestamps_become_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-40"), None);
    }

    #[test]
    fn test_rates_coerce_or_drop_to_none() {
        assert_eq!(parse_rate("25"), Some(BigDecimal::from(25)));
        assert_eq!(parse_rate("oops"), None);
    }
}
