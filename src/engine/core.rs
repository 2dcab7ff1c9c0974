//! Engine orchestrator composing the reconciliation pipeline

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::classify::classify;
use crate::engine::matching::match_records;
use crate::engine::normalize::{normalize_orders, normalize_settlements};
use crate::engine::reconcile::reconcile;
use crate::engine::summary::VatSummary;
use crate::types::{DateField, RawRow, ReconResult, ReportingPeriod, ResultSet};

/// Caller-supplied control parameters for one reconciliation run.
///
/// The period is validated at construction ([`ReportingPeriod::new`]), so a
/// params value always carries a well-formed range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationParams {
    /// Inclusive reporting period.
    pub period: ReportingPeriod,
    /// Which timestamp drives period classification.
    pub date_field: DateField,
}

/// Everything one reconciliation run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Matched records grouped by period bucket.
    pub results: ResultSet,
    /// Per-VAT-rate totals over the all-matched group.
    pub vat_summary: VatSummary,
    /// Earliest and latest selected-date value among matched records.
    pub date_span: Option<(NaiveDateTime, NaiveDateTime)>,
}

/// The reconciliation engine.
///
/// Stateless and side-effect free: each [`run`](Self::run) derives its whole
/// result from the inputs, so concurrent runs on independent inputs are safe
/// by construction.
pub struct ReconciliationEngine;

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run the full pipeline: normalize both exports, join on order id,
    /// compute differences, classify into period buckets and summarize by
    /// VAT rate.
    pub fn run(
        &self,
        wgr_rows: &[RawRow],
        qliro_rows: &[RawRow],
        params: &ReconciliationParams,
    ) -> ReconResult<ReconciliationReport> {
        let orders = normalize_orders(wgr_rows)?;
        let settlements = normalize_settlements(qliro_rows)?;
        debug!(
            orders = orders.len(),
            settlements = settlements.len(),
            "normalized input rows"
        );

        let pairs = match_records(&orders, &settlements);
        debug!(matched = pairs.len(), "joined ledgers on order id");

        let reconciled = reconcile(pairs);
        let mismatches = reconciled.iter().filter(|r| r.is_mismatch).count();
        debug!(
            records = reconciled.len(),
            mismatches, "reconciled amounts"
        );

        let results = classify(reconciled, &params.period, params.date_field);
        let vat_summary = VatSummary::for_records(&results.all_matched);
        let date_span = results.date_span(params.date_field);

        Ok(ReconciliationReport {
            results,
            vat_summary,
            date_span,
        })
    }
}
