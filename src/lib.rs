//! # Reconciliation Core
//!
//! A library for reconciling two independently produced transaction ledgers
//! covering the same retail orders: a warehouse/order-management export (WGR)
//! and a payment-settlement provider export (QLIRO). The engine matches
//! records by order id, evaluates amount equality under a fixed tolerance,
//! classifies matched orders against a reporting period and summarizes totals
//! per VAT rate.
//!
//! ## Features
//!
//! - **Normalization**: typed records from raw export rows, checkout-provider
//!   filtering, join-key canonicalization, paid-total derivation
//! - **Matching**: relational inner join on order id, cross-product on
//!   duplicate keys
//! - **Reconciliation**: double-rounded amount differences with a fixed 0.01
//!   tolerance and fail-safe coercion of malformed cells
//! - **Classification**: in-period / ahead-of-period buckets on a
//!   caller-selected date field with inclusive calendar bounds
//! - **Summaries**: per-VAT-rate totals, missing rates kept visible
//!
//! Ingestion and presentation are out of scope: the caller supplies
//! already-parsed rows and renders the structured results.
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     DateField, ReconciliationEngine, ReconciliationParams, ReportingPeriod,
//! };
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), reconciliation_core::ReconError> {
//! let period = ReportingPeriod::new(
//!     NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
//!     NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date"),
//! )?;
//! let params = ReconciliationParams {
//!     period,
//!     date_field: DateField::SettlementDate,
//! };
//!
//! let engine = ReconciliationEngine::new();
//! let report = engine.run(&[], &[], &params)?;
//! assert!(report.results.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use engine::*;
pub use types::*;
