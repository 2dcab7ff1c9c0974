//! Temporal classification of reconciled records against a reporting period

use crate::types::{DateField, ReconciledRecord, ReportingPeriod, ResultSet};

/// Partition reconciled records into period buckets on the selected date
/// field.
///
/// Bounds are inclusive at start-of-day precision; `ahead_of_period` is
/// strictly after the end bound with no upper limit, `before_period`
/// strictly before the start bound. Records whose selected date is absent
/// remain in `all_matched` only.
pub fn classify(
    records: Vec<ReconciledRecord>,
    period: &ReportingPeriod,
    date_field: DateField,
) -> ResultSet {
    let mut before_period = Vec::new();
    let mut in_period = Vec::new();
    let mut ahead_of_period = Vec::new();

    for record in &records {
        match record.date_value(date_field) {
            Some(ts) if period.contains(ts) => in_period.push(record.clone()),
            Some(ts) if ts > period.end_bound() => ahead_of_period.push(record.clone()),
            Some(_) => before_period.push(record.clone()),
            None => {}
        }
    }

    ResultSet {
        all_matched: records,
        before_period,
        in_period,
        ahead_of_period,
    }
}
