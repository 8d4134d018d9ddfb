//! Duplicate-row detection and removal.

use std::collections::HashSet;

use clif_ingest::any_to_string;
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NewChunkedArray};

/// Counts rows that are exact duplicates of an earlier row across all
/// columns.
pub fn count_duplicates(data: &DataFrame) -> usize {
    let mut seen = HashSet::new();
    row_keys(data)
        .into_iter()
        .filter(|key| !seen.insert(key.clone()))
        .count()
}

/// Returns a frame with only the first occurrence of each row kept.
pub fn drop_duplicates(data: &DataFrame) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let keep: Vec<bool> = row_keys(data)
        .into_iter()
        .map(|key| seen.insert(key))
        .collect();
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    data.filter(&mask).map_err(QcError::dataframe)
}

// Keys are the cell strings themselves; joining them with a separator
// would let free-text cells containing the separator collide.
fn row_keys(data: &DataFrame) -> Vec<Vec<String>> {
    let columns = data.get_columns();
    (0..data.height())
        .map(|idx| {
            columns
                .iter()
                .map(|column| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
                .collect()
        })
        .collect()
}
