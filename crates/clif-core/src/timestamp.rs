//! Permissive timestamp parsing.
//!
//! Datasets arrive with a handful of timestamp spellings; coercion tries
//! each known format and degrades unparseable cells to missing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clif_ingest::any_to_datetime;
use polars::prelude::AnyValue;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a timestamp string, trying each known format in order.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Reads a cell as a timestamp, accepting both physical datetime dtypes
/// and textual spellings.
pub fn cell_datetime(value: &AnyValue<'_>) -> Option<NaiveDateTime> {
    if let Some(parsed) = any_to_datetime(value) {
        return Some(parsed);
    }
    match value {
        AnyValue::String(s) => parse_datetime(s),
        AnyValue::StringOwned(s) => parse_datetime(s),
        _ => None,
    }
}

/// Epoch milliseconds for storage in a millisecond-unit datetime column.
pub fn datetime_to_millis(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        for raw in [
            "2024-01-15 08:30:00",
            "2024-01-15T08:30:00",
            "2024-01-15 08:30",
            "01/15/2024 08:30:00",
            "2024-01-15T08:30:00+00:00",
        ] {
            let parsed = parse_datetime(raw).unwrap();
            assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 08:30", "{raw}");
        }
    }

    #[test]
    fn bare_dates_become_midnight() {
        let parsed = parse_datetime("2024-01-15").unwrap();
        assert_eq!(parsed.to_string(), "2024-01-15 00:00:00");
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("15th of January").is_none());
    }

    #[test]
    fn cell_datetime_accepts_strings_and_physical_values() {
        assert!(cell_datetime(&AnyValue::String("2024-01-15 08:30:00")).is_some());
        assert!(cell_datetime(&AnyValue::Float64(1.5)).is_none());
        assert!(cell_datetime(&AnyValue::Null).is_none());
    }
}
