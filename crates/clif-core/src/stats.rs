//! Grouped descriptive statistics.

use std::collections::HashMap;

use clif_ingest::{any_to_f64, any_to_string_non_empty};
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};

/// Descriptive statistics for one category group.
///
/// `count` is the group's non-missing observation count; the missing
/// percentage divides the group's missing cells by the whole table's row
/// count, matching the missingness analyzer's convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub category: String,
    pub count: usize,
    pub missing_percentage: f64,
    pub min: Option<f64>,
    pub mean: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Groups rows by `category_column` and summarizes `value_column`.
/// Groups come back sorted ascending by category label.
pub fn grouped_stats(
    data: &DataFrame,
    category_column: &str,
    value_column: &str,
) -> Result<Vec<GroupStats>> {
    let categories = data
        .column(category_column)
        .map_err(|_| QcError::ColumnNotFound(category_column.to_string()))?;
    let values = data
        .column(value_column)
        .map_err(|_| QcError::ColumnNotFound(value_column.to_string()))?;

    let total_rows = data.height();
    let mut groups: HashMap<String, Vec<Option<f64>>> = HashMap::new();
    for idx in 0..total_rows {
        let Some(category) = any_to_string_non_empty(categories.get(idx).unwrap_or(AnyValue::Null))
        else {
            continue;
        };
        let value = any_to_f64(values.get(idx).unwrap_or(AnyValue::Null));
        groups.entry(category).or_default().push(value);
    }

    let mut stats: Vec<GroupStats> = groups
        .into_iter()
        .map(|(category, cells)| summarize(category, &cells, total_rows))
        .collect();
    stats.sort_by(|a, b| a.category.cmp(&b.category));
    Ok(stats)
}

fn summarize(category: String, cells: &[Option<f64>], total_rows: usize) -> GroupStats {
    let mut present: Vec<f64> = cells.iter().filter_map(|cell| *cell).collect();
    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let missing = cells.len() - present.len();
    let missing_percentage = if total_rows == 0 {
        0.0
    } else {
        missing as f64 / total_rows as f64 * 100.0
    };

    let mean = if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    };

    GroupStats {
        category,
        count: present.len(),
        missing_percentage,
        min: present.first().copied(),
        mean,
        q1: quantile(&present, 0.25),
        median: quantile(&present, 0.5),
        q3: quantile(&present, 0.75),
        max: present.last().copied(),
    }
}

/// Linear-interpolation quantile over an ascending-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
