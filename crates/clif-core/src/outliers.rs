//! Nulling values outside clinically plausible ranges.
//!
//! Two table shapes share one contract: values strictly below the lower
//! limit or strictly above the upper limit become null, and the outcome
//! reports how many cells were replaced.

use clif_ingest::{ThresholdTable, any_to_f64, any_to_string};
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-threshold-row record of the outliers found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierDetail {
    /// Category value (long shape) or column name (wide shape).
    pub key: String,
    pub lower: f64,
    pub upper: f64,
    pub values: Vec<f64>,
}

/// Result of one outlier-correction pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutlierOutcome {
    pub replaced_count: usize,
    /// Replacements over the whole table's row count.
    pub proportion: f64,
    pub details: Vec<OutlierDetail>,
}

/// Long shape: thresholds keyed by the values of `category_column`,
/// applied against a shared numeric `value_column`.
///
/// Threshold categories absent from the dataset contribute an empty
/// detail entry and zero replacements.
pub fn replace_outliers_long(
    data: &mut DataFrame,
    thresholds: &ThresholdTable,
    category_column: &str,
    value_column: &str,
) -> Result<OutlierOutcome> {
    let categories: Vec<String> = {
        let column = data
            .column(category_column)
            .map_err(|_| QcError::ColumnNotFound(category_column.to_string()))?;
        (0..data.height())
            .map(|idx| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect()
    };
    let mut values = numeric_cells(data, value_column)?;

    let mut outcome = OutlierOutcome::default();
    for row in &thresholds.rows {
        let mut found = Vec::new();
        for (idx, category) in categories.iter().enumerate() {
            if *category != row.key {
                continue;
            }
            if let Some(value) = values[idx]
                && (value < row.lower || value > row.upper)
            {
                found.push(value);
                values[idx] = None;
            }
        }
        outcome.replaced_count += found.len();
        outcome.details.push(OutlierDetail {
            key: row.key.clone(),
            lower: row.lower,
            upper: row.upper,
            values: found,
        });
    }

    data.with_column(Series::new(value_column.into(), values))
        .map_err(QcError::dataframe)?;
    outcome.proportion = proportion(outcome.replaced_count, data.height());
    debug!(
        column = value_column,
        replaced = outcome.replaced_count,
        "long-shape outlier pass"
    );
    Ok(outcome)
}

/// Wide shape: each threshold row names a dataset column directly.
///
/// A threshold row naming a column the dataset does not have is a
/// configuration error, surfaced as [`QcError::ColumnNotFound`].
pub fn replace_outliers_wide(
    data: &mut DataFrame,
    thresholds: &ThresholdTable,
) -> Result<OutlierOutcome> {
    let mut outcome = OutlierOutcome::default();
    for row in &thresholds.rows {
        let mut values = numeric_cells(data, &row.key)?;
        let mut found = Vec::new();
        for cell in values.iter_mut() {
            if let Some(value) = *cell
                && (value < row.lower || value > row.upper)
            {
                found.push(value);
                *cell = None;
            }
        }
        outcome.replaced_count += found.len();
        outcome.details.push(OutlierDetail {
            key: row.key.clone(),
            lower: row.lower,
            upper: row.upper,
            values: found,
        });
        data.with_column(Series::new(row.key.as_str().into(), values))
            .map_err(QcError::dataframe)?;
    }
    outcome.proportion = proportion(outcome.replaced_count, data.height());
    debug!(replaced = outcome.replaced_count, "wide-shape outlier pass");
    Ok(outcome)
}

fn numeric_cells(data: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let column = data
        .column(column)
        .map_err(|_| QcError::ColumnNotFound(column.to_string()))?;
    Ok((0..data.height())
        .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

fn proportion(replaced: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        replaced as f64 / total as f64
    }
}
