//! The per-table QC pipeline.
//!
//! Each table runs the same spine: load, sample, dedupe, type-validate,
//! missingness, required columns. Domain-specific checks (derived
//! numerics, vocabulary reconciliation, outliers, summary statistics,
//! overlap detection) hang off the table name.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{info, warn};

use clif_core::{
    check_required_columns, count_duplicates, derive_numeric_column, detect_overlaps,
    downsample, drop_duplicates, grouped_stats, map_names_to_categories, missingness,
    reconcile, replace_outliers_long, replace_outliers_wide, validate_and_convert,
};
use clif_ingest::{FileType, ThresholdTable, discover_table_files, read_dataset};
use clif_model::{CheckKind, DtypeStatus, QcError, QcReport, TableSchema};
use clif_report::{
    mapping_table, missingness_table, outlier_table, overlap_table, print_qc_summary,
    stats_table, validation_table, write_mapping_csv, write_missingness_csv, write_overlap_csv,
    write_report_json, write_revised_dataset, write_stats_csv, write_validation_csv,
};

use crate::session::QcSession;

/// Result of one table's QC pass.
pub struct TableOutcome {
    pub report: QcReport,
    pub frame: DataFrame,
}

/// Runs the QC pipeline over every CLIF table file in `data_dir`.
pub fn run_directory(session: &mut QcSession, data_dir: &Path) -> Result<Vec<QcReport>> {
    session.load_hospitalization_lookup(data_dir)?;
    let files = discover_table_files(data_dir)?;
    if files.is_empty() {
        anyhow::bail!("no clif_<table> files found in {}", data_dir.display());
    }

    let mut reports = Vec::new();
    for (table, path) in files {
        if session.registry.table(&table).is_none() {
            warn!(table, "no schema for table; skipping");
            continue;
        }
        info!(table, path = %path.display(), "running QC");
        let outcome = run_table(session, &table, &path)
            .with_context(|| format!("QC for table '{table}'"))?;
        print_qc_summary(&outcome.report);
        reports.push(outcome.report);
    }

    if let Some(output_dir) = &session.output_dir {
        write_report_json(output_dir, &reports)?;
    }
    Ok(reports)
}

/// Runs the QC pipeline for a single table file.
pub fn run_table(session: &QcSession, table: &str, path: &Path) -> Result<TableOutcome> {
    let schema = session
        .registry
        .table(table)
        .ok_or_else(|| QcError::UnknownTable(table.to_string()))?;
    let mut report = QcReport::new(schema.table.clone());

    let mut frame = read_dataset(path).with_context(|| format!("reading {}", path.display()))?;
    let loaded_rows = frame.height();
    if session.sample_fraction < 1.0 {
        frame = downsample(&frame, session.sample_fraction, session.seed)?;
        info!(
            loaded = loaded_rows,
            sampled = frame.height(),
            fraction = session.sample_fraction,
            "downsampled before validation"
        );
    }

    print_overview(&schema.table, &frame, loaded_rows);

    // Exact duplicates are dropped from the working frame so downstream
    // counts describe the deduplicated data.
    let duplicates = count_duplicates(&frame);
    report.add_finding(
        CheckKind::Duplicates,
        format!("{duplicates} duplicate row(s) found"),
    );
    if duplicates > 0 {
        report.recommend("Remove duplicate rows before analysis.".to_string());
        frame = drop_duplicates(&frame)?;
    }

    let validations = validate_and_convert(schema, &mut frame)?;
    println!("{}", validation_table(&validations));
    let mismatches = validations
        .iter()
        .filter(|v| v.status == DtypeStatus::Mismatch)
        .count();
    let absent = validations
        .iter()
        .filter(|v| v.status == DtypeStatus::Missing)
        .count();
    report.add_finding(
        CheckKind::DataTypes,
        format!("{mismatches} column(s) coerced, {absent} schema column(s) absent"),
    );

    let missing_records = missingness(&frame);
    println!(
        "{}",
        missingness_table(&missing_records, !session.show_all_missingness)
    );
    let affected = missing_records
        .iter()
        .filter(|record| record.missing_count > 0)
        .count();
    report.add_finding(
        CheckKind::Missingness,
        format!("{affected} column(s) contain missing values"),
    );

    let required = check_required_columns(schema, &frame);
    if required.is_all_present() {
        report.add_finding(CheckKind::RequiredColumns, "all required columns present");
    } else {
        report.add_finding(
            CheckKind::RequiredColumns,
            format!("missing required columns: {}", required.missing().join(", ")),
        );
        report.recommend("Add the missing required columns to the dataset.".to_string());
    }

    run_domain_checks(session, schema, &mut frame, &mut report)?;

    let mappings = map_names_to_categories(&frame)?;
    for mapping in &mappings {
        println!("{}", mapping_table(mapping));
    }
    report.add_finding(
        CheckKind::Mapping,
        format!("{} name-to-category pair(s) mapped", mappings.len()),
    );

    if let Some(output_dir) = &session.output_dir {
        write_validation_csv(output_dir, &schema.table, &validations)?;
        write_missingness_csv(output_dir, &schema.table, &missing_records)?;
        write_mapping_csv(output_dir, &schema.table, &mappings)?;
        if session.export_revised {
            let file_type = FileType::from_path(path)?;
            write_revised_dataset(&mut frame, output_dir, &schema.table, file_type)?;
        }
    }

    Ok(TableOutcome { report, frame })
}

fn print_overview(table: &str, frame: &DataFrame, loaded_rows: usize) {
    let mut line = format!("{table}: {} row(s)", frame.height());
    if frame.height() < loaded_rows {
        line.push_str(&format!(" (sampled from {loaded_rows})"));
    }
    for id_column in ["hospitalization_id", "patient_id"] {
        if let Ok(column) = frame.column(id_column)
            && let Ok(unique) = column.n_unique()
        {
            line.push_str(&format!(", {unique} unique {id_column} value(s)"));
            break;
        }
    }
    println!("{line}");
}

fn run_domain_checks(
    session: &QcSession,
    schema: &TableSchema,
    frame: &mut DataFrame,
    report: &mut QcReport,
) -> Result<()> {
    match schema.table.to_lowercase().as_str() {
        "labs" => {
            if frame.column("lab_value").is_ok() {
                let unparseable =
                    derive_numeric_column(frame, "lab_value", "lab_value_numeric")?;
                report.add_finding(
                    CheckKind::NumericDerivation,
                    format!("{unparseable} non-numeric lab_value cell(s) set to missing"),
                );
                if let Some(thresholds) = session.thresholds_for("labs", "lab_category")? {
                    check_categories(frame, &thresholds, "lab_category", report)?;
                    apply_long_outliers(
                        frame,
                        &thresholds,
                        "lab_category",
                        "lab_value_numeric",
                        report,
                    )?;
                }
                summarize(session, frame, "lab_category", "lab_value_numeric", report)?;
            }
        }
        "vitals" => {
            if let Some(thresholds) = session.thresholds_for("vitals", "vital_category")? {
                check_categories(frame, &thresholds, "vital_category", report)?;
                apply_long_outliers(
                    frame,
                    &thresholds,
                    "vital_category",
                    "vital_value",
                    report,
                )?;
            }
            if frame.column("vital_value").is_ok() {
                summarize(session, frame, "vital_category", "vital_value", report)?;
            }
        }
        "respiratory_support" => {
            if let Some(thresholds) =
                session.thresholds_for("respiratory_support", "variable_name")?
            {
                let outcome = replace_outliers_wide(frame, &thresholds)?;
                println!("{}", outlier_table(&outcome));
                report.add_finding(
                    CheckKind::Outliers,
                    format!(
                        "{} outlier(s) replaced ({:.2}% of rows)",
                        outcome.replaced_count,
                        outcome.proportion * 100.0
                    ),
                );
            }
        }
        "adt" => {
            let overlaps = detect_overlaps(frame, session.hospitalization_lookup())?;
            if overlaps.is_empty() {
                report.add_finding(CheckKind::Overlaps, "no overlapping admissions");
            } else {
                println!("{}", overlap_table(&overlaps));
                report.add_finding(
                    CheckKind::Overlaps,
                    format!("{} overlapping admission(s) found", overlaps.len()),
                );
                report.recommend(
                    "Review overlapping admission intervals for affected patients.".to_string(),
                );
                if let Some(output_dir) = &session.output_dir {
                    write_overlap_csv(output_dir, &report.table, &overlaps)?;
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_categories(
    frame: &DataFrame,
    thresholds: &ThresholdTable,
    category_column: &str,
    report: &mut QcReport,
) -> Result<()> {
    let reference: Vec<String> = thresholds.keys().map(str::to_string).collect();
    let outcome = reconcile(frame, &reference, category_column)?;
    for similar in &outcome.similar {
        report.add_finding(
            CheckKind::Categories,
            format!(
                "'{}' not found; closest observed value is '{}' (score {:.0})",
                similar.reference, similar.closest, similar.score
            ),
        );
    }
    for missing in &outcome.missing {
        report.add_finding(
            CheckKind::Categories,
            format!("category '{missing}' not found in {category_column}"),
        );
    }
    if !outcome.missing.is_empty() {
        report.recommend(format!(
            "Map source values to the expected {category_column} vocabulary."
        ));
    }
    Ok(())
}

fn apply_long_outliers(
    frame: &mut DataFrame,
    thresholds: &ThresholdTable,
    category_column: &str,
    value_column: &str,
    report: &mut QcReport,
) -> Result<()> {
    if frame.column(value_column).is_err() {
        warn!(column = value_column, "value column absent; skipping outlier check");
        return Ok(());
    }
    let outcome = replace_outliers_long(frame, thresholds, category_column, value_column)?;
    println!("{}", outlier_table(&outcome));
    report.add_finding(
        CheckKind::Outliers,
        format!(
            "{} outlier(s) replaced ({:.2}% of rows)",
            outcome.replaced_count,
            outcome.proportion * 100.0
        ),
    );
    if outcome.replaced_count > 0 {
        report.recommend(format!(
            "Inspect replaced {value_column} outliers against source records."
        ));
    }
    Ok(())
}

fn summarize(
    session: &QcSession,
    frame: &DataFrame,
    category_column: &str,
    value_column: &str,
    report: &mut QcReport,
) -> Result<()> {
    if frame.column(category_column).is_err() || frame.column(value_column).is_err() {
        return Ok(());
    }
    let stats = grouped_stats(frame, category_column, value_column)?;
    println!("{}", stats_table(&stats));
    report.add_finding(
        CheckKind::SummaryStats,
        format!("summary statistics computed for {} categorie(s)", stats.len()),
    );
    if let Some(output_dir) = &session.output_dir {
        write_stats_csv(output_dir, &report.table, &stats)?;
    }
    Ok(())
}
