//! Validation utilities

use crate::types::{RawRow, ReconError, ReconResult, Side};

/// Look up a required cell, failing with a schema error naming the column and
/// the offending side when the column is absent from the row.
pub fn require_cell<'a>(row: &'a RawRow, column: &str, side: Side) -> ReconResult<&'a str> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| ReconError::Schema {
            side,
            column: column.to_string(),
        })
}

/// Validate that an order id is usable as a join key.
pub fn validate_order_id(order_id: &str) -> bool {
    !order_id.trim().is_empty()
}
