//! CSV and JSON artifacts written to a destination directory.

use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;

use clif_core::{GroupStats, MissingnessRecord, NameCategoryTable, OverlapRecord};
use clif_model::{DtypeValidation, QcError, QcReport, Result};

const REPORT_SCHEMA: &str = "clif-qc.report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
struct QcReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    reports: &'a [QcReport],
}

/// Writes all per-table reports as one versioned JSON document.
pub fn write_report_json(output_dir: &Path, reports: &[QcReport]) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("qc_report.json");
    let payload = QcReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        reports,
    };
    let json = serde_json::to_string_pretty(&payload).map_err(|err| QcError::Message(err.to_string()))?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    info!(path = %output_path.display(), "wrote QC report");
    Ok(output_path)
}

/// Type-validation results as `<table>_validation.csv`.
pub fn write_validation_csv(
    output_dir: &Path,
    table: &str,
    results: &[DtypeValidation],
) -> Result<PathBuf> {
    let path = artifact_path(output_dir, table, "validation")?;
    let mut writer = csv_writer(&path)?;
    write_record(&mut writer, &["column", "actual", "expected", "status"])?;
    for result in results {
        write_record(
            &mut writer,
            &[
                &result.column,
                &result.actual,
                result.expected.as_str(),
                result.status.as_str(),
            ],
        )?;
    }
    finish(writer, &path)
}

/// Missingness tallies as `<table>_missingness.csv`.
pub fn write_missingness_csv(
    output_dir: &Path,
    table: &str,
    records: &[MissingnessRecord],
) -> Result<PathBuf> {
    let path = artifact_path(output_dir, table, "missingness")?;
    let mut writer = csv_writer(&path)?;
    write_record(&mut writer, &["column", "missing_count", "missing_percentage"])?;
    for record in records {
        write_record(
            &mut writer,
            &[
                &record.column,
                &record.missing_count.to_string(),
                &format!("{:.4}", record.missing_percentage),
            ],
        )?;
    }
    finish(writer, &path)
}

/// Grouped summary statistics as `<table>_summary_stats.csv`.
pub fn write_stats_csv(output_dir: &Path, table: &str, stats: &[GroupStats]) -> Result<PathBuf> {
    let path = artifact_path(output_dir, table, "summary_stats")?;
    let mut writer = csv_writer(&path)?;
    write_record(
        &mut writer,
        &["category", "n", "missing_percentage", "min", "mean", "q1", "median", "q3", "max"],
    )?;
    for group in stats {
        write_record(
            &mut writer,
            &[
                &group.category,
                &group.count.to_string(),
                &format!("{:.4}", group.missing_percentage),
                &optional(group.min),
                &optional(group.mean),
                &optional(group.q1),
                &optional(group.median),
                &optional(group.q3),
                &optional(group.max),
            ],
        )?;
    }
    finish(writer, &path)
}

/// All name-to-category frequency tables as `<table>_mappings.csv`.
pub fn write_mapping_csv(
    output_dir: &Path,
    table: &str,
    mappings: &[NameCategoryTable],
) -> Result<PathBuf> {
    let path = artifact_path(output_dir, table, "mappings")?;
    let mut writer = csv_writer(&path)?;
    write_record(
        &mut writer,
        &["name_column", "category_column", "name", "category", "count"],
    )?;
    for mapping in mappings {
        for entry in &mapping.entries {
            write_record(
                &mut writer,
                &[
                    &mapping.name_column,
                    &mapping.category_column,
                    &entry.name,
                    &entry.category,
                    &entry.count.to_string(),
                ],
            )?;
        }
    }
    finish(writer, &path)
}

/// Overlapping admission intervals as `<table>_overlaps.csv`.
pub fn write_overlap_csv(
    output_dir: &Path,
    table: &str,
    overlaps: &[OverlapRecord],
) -> Result<PathBuf> {
    let path = artifact_path(output_dir, table, "overlaps")?;
    let mut writer = csv_writer(&path)?;
    write_record(
        &mut writer,
        &[
            "patient_id",
            "location_name",
            "location_category",
            "overlapping_location",
            "admission_start",
            "admission_end",
            "next_admission_start",
        ],
    )?;
    for overlap in overlaps {
        write_record(
            &mut writer,
            &[
                &overlap.patient_id,
                &overlap.location_name,
                &overlap.location_category,
                &overlap.overlapping_location,
                &timestamp(overlap.admission_start),
                &timestamp(overlap.admission_end),
                &timestamp(overlap.next_admission_start),
            ],
        )?;
    }
    finish(writer, &path)
}

fn artifact_path(output_dir: &Path, table: &str, artifact: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    Ok(output_dir.join(format!("{}_{artifact}.csv", table.to_lowercase())))
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).map_err(|err| QcError::Message(format!("{}: {err}", path.display())))
}

fn write_record(writer: &mut csv::Writer<std::fs::File>, fields: &[&str]) -> Result<()> {
    writer
        .write_record(fields)
        .map_err(|err| QcError::Message(err.to_string()))
}

fn finish(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<PathBuf> {
    writer
        .flush()
        .map_err(|err| QcError::Message(err.to_string()))?;
    info!(path = %path.display(), "wrote artifact");
    Ok(path.to_path_buf())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v}")).unwrap_or_default()
}

fn timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clif_model::{CheckKind, ColumnType, DtypeStatus};

    #[test]
    fn report_json_is_versioned() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = QcReport::new("Labs");
        report.add_finding(CheckKind::Outliers, "3 replacement(s) for sodium");
        report.recommend("Review sodium thresholds.");

        let path = write_report_json(dir.path(), std::slice::from_ref(&report)).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["schema"], "clif-qc.report");
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["reports"][0]["table"], "Labs");
        assert_eq!(value["reports"][0]["findings"][0]["check"], "outliers");
    }

    #[test]
    fn validation_csv_round_trips_headers() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![DtypeValidation {
            column: "vital_value".to_string(),
            actual: "str".to_string(),
            expected: ColumnType::Float,
            status: DtypeStatus::Mismatch,
        }];
        let path = write_validation_csv(dir.path(), "Vitals", &results).unwrap();
        assert!(path.ends_with("vitals_validation.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("column,actual,expected,status"));
        assert!(contents.contains("vital_value,str,float,Mismatch"));
    }

    #[test]
    fn overlap_csv_formats_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let start = NaiveDateTime::parse_from_str("2024-01-15 08:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let overlaps = vec![OverlapRecord {
            patient_id: "P1".to_string(),
            location_name: "ER".to_string(),
            location_category: "ed".to_string(),
            overlapping_location: "ICU".to_string(),
            admission_start: start,
            admission_end: start + chrono::Duration::hours(2),
            next_admission_start: start + chrono::Duration::hours(1),
        }];
        let path = write_overlap_csv(dir.path(), "ADT", &overlaps).unwrap();
        assert!(path.ends_with("adt_overlaps.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("P1,ER,ed,ICU,2024-01-15 08:00:00,2024-01-15 10:00:00,"));
    }

    #[test]
    fn stats_csv_leaves_missing_values_blank() {
        let dir = tempfile::tempdir().unwrap();
        let stats = vec![GroupStats {
            category: "sodium".to_string(),
            count: 0,
            missing_percentage: 100.0,
            min: None,
            mean: None,
            q1: None,
            median: None,
            q3: None,
            max: None,
        }];
        let path = write_stats_csv(dir.path(), "Labs", &stats).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("sodium,0,100.0000,,,,,,"));
    }
}
