//! Per-column missingness counts.

use clif_ingest::is_missing_value;
use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};

/// Missing-value tally for one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingnessRecord {
    pub column: String,
    pub missing_count: usize,
    /// Share of the whole table's rows, 0 to 100.
    pub missing_percentage: f64,
}

/// Tallies missing cells per column, in the frame's column order.
///
/// Nulls and blank text both count as missing. The percentage uses the
/// whole-table row count as its denominator.
pub fn missingness(data: &DataFrame) -> Vec<MissingnessRecord> {
    let total = data.height();
    let mut records = Vec::with_capacity(data.width());
    for column in data.get_columns() {
        let missing_count = (0..total)
            .filter(|&idx| is_missing_value(&column.get(idx).unwrap_or(AnyValue::Null)))
            .count();
        let missing_percentage = if total == 0 {
            0.0
        } else {
            missing_count as f64 / total as f64 * 100.0
        };
        records.push(MissingnessRecord {
            column: column.name().to_string(),
            missing_count,
            missing_percentage,
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn percentage_uses_whole_table_denominator() {
        let frame = df! {
            "vital_category" => [Some("heart_rate"), None, Some("sbp"), Some("map")],
            "vital_value" => [Some(72.0), Some(120.0), None, None],
        }
        .unwrap();

        let records = missingness(&frame);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].column, "vital_category");
        assert_eq!(records[0].missing_count, 1);
        assert_eq!(records[0].missing_percentage, 25.0);
        assert_eq!(records[1].missing_count, 2);
        assert_eq!(records[1].missing_percentage, 50.0);
    }

    #[test]
    fn zero_missing_means_zero_percent() {
        let frame = df! { "patient_id" => ["P1", "P2"] }.unwrap();
        let records = missingness(&frame);
        assert_eq!(records[0].missing_count, 0);
        assert_eq!(records[0].missing_percentage, 0.0);
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let frame = df! { "location_name" => ["ER", "  ", ""] }.unwrap();
        let records = missingness(&frame);
        assert_eq!(records[0].missing_count, 2);
    }

    #[test]
    fn empty_frame_yields_zero_percentages() {
        let frame = DataFrame::empty();
        assert!(missingness(&frame).is_empty());
    }
}
