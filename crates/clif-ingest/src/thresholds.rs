//! Outlier threshold reference tables.
//!
//! Each domain needing outlier checks ships a CSV of plausible value
//! ranges, either keyed by category value (long shape) or by column name
//! (wide shape). Both shapes share the `lower_limit`/`upper_limit` columns
//! and differ only in the key column's name.

use std::path::Path;

use clif_model::{QcError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const LOWER_COLUMN: &str = "lower_limit";
const UPPER_COLUMN: &str = "upper_limit";

/// One plausible-range row from a threshold file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRow {
    /// Category value (long shape) or column name (wide shape).
    pub key: String,
    pub lower: f64,
    pub upper: f64,
}

/// A loaded threshold reference table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub rows: Vec<ThresholdRow>,
}

impl ThresholdTable {
    pub fn new(rows: Vec<ThresholdRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks a key up with an exact match.
    pub fn get(&self, key: &str) -> Option<&ThresholdRow> {
        self.rows.iter().find(|row| row.key == key)
    }

    /// The keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.key.as_str())
    }
}

/// Reads a threshold CSV, taking keys from `key_column`.
///
/// Rows whose limits do not parse as numbers are skipped with a log line;
/// a missing key or limit column is a configuration error.
pub fn read_threshold_table(path: &Path, key_column: &str) -> Result<ThresholdTable> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|err| QcError::Message(format!("{}: {err}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|err| QcError::Message(err.to_string()))?
        .clone();
    let key_idx = column_index(&headers, key_column)?;
    let lower_idx = column_index(&headers, LOWER_COLUMN)?;
    let upper_idx = column_index(&headers, UPPER_COLUMN)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| QcError::Message(err.to_string()))?;
        let key = record.get(key_idx).unwrap_or_default().trim();
        if key.is_empty() {
            continue;
        }
        let lower = record.get(lower_idx).and_then(parse_limit);
        let upper = record.get(upper_idx).and_then(parse_limit);
        match (lower, upper) {
            (Some(lower), Some(upper)) => rows.push(ThresholdRow {
                key: key.to_string(),
                lower,
                upper,
            }),
            _ => debug!(key, "skipping threshold row with non-numeric limits"),
        }
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded threshold table");
    Ok(ThresholdTable::new(rows))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| QcError::ColumnNotFound(name.to_string()))
}

fn parse_limit(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_long_shape_thresholds() {
        let (_dir, path) = write_csv(
            "lab_category,lower_limit,upper_limit\n\
             sodium,110,160\n\
             potassium,2.0,7.5\n",
        );
        let table = read_threshold_table(&path, "lab_category").unwrap();
        assert_eq!(table.rows.len(), 2);
        let sodium = table.get("sodium").unwrap();
        assert_eq!(sodium.lower, 110.0);
        assert_eq!(sodium.upper, 160.0);
    }

    #[test]
    fn missing_key_column_is_a_config_error() {
        let (_dir, path) = write_csv("variable_name,lower_limit,upper_limit\nmap,40,180\n");
        let err = read_threshold_table(&path, "lab_category").unwrap_err();
        assert!(matches!(err, QcError::ColumnNotFound(name) if name == "lab_category"));
    }

    #[test]
    fn non_numeric_limits_are_skipped() {
        let (_dir, path) = write_csv(
            "variable_name,lower_limit,upper_limit\n\
             heart_rate,20,300\n\
             sbp,n/a,300\n",
        );
        let table = read_threshold_table(&path, "variable_name").unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].key, "heart_rate");
    }
}
