//! Derived numeric columns.
//!
//! Labs carry `lab_value` as free text (results like "12 mg/dL" or "<0.5"
//! are legitimate); numeric QC runs against a derived column instead of
//! mutating the original.

use clif_ingest::{any_to_string, parse_f64};
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::debug;

/// Adds `target` holding `source` parsed as a float.
///
/// Cells that do not parse become null. Returns how many non-empty
/// source cells failed to parse.
pub fn derive_numeric_column(data: &mut DataFrame, source: &str, target: &str) -> Result<usize> {
    let column = data
        .column(source)
        .map_err(|_| QcError::ColumnNotFound(source.to_string()))?;

    let mut unparseable = 0usize;
    let values: Vec<Option<f64>> = (0..data.height())
        .map(|idx| {
            let raw = any_to_string(column.get(idx).unwrap_or(AnyValue::Null));
            let parsed = parse_f64(&raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                unparseable += 1;
            }
            parsed
        })
        .collect();

    data.with_column(Series::new(target.into(), values))
        .map_err(QcError::dataframe)?;
    debug!(source, target, unparseable, "derived numeric column");
    Ok(unparseable)
}
