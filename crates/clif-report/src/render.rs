//! Console rendering of QC results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use clif_core::{GroupStats, MissingnessRecord, NameCategoryTable, OutlierOutcome, OverlapRecord};
use clif_ingest::format_numeric;
use clif_model::{DtypeStatus, DtypeValidation, QcReport};

/// Type-validation results, one row per schema column.
pub fn validation_table(results: &[DtypeValidation]) -> Table {
    let mut table = new_table(vec!["Column", "Actual", "Expected", "Status"]);
    for result in results {
        let status = match result.status {
            DtypeStatus::Match => Cell::new("Match").fg(Color::Green),
            DtypeStatus::Mismatch => Cell::new("Mismatch").fg(Color::Yellow),
            DtypeStatus::Missing => Cell::new("Missing").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&result.column),
            Cell::new(&result.actual),
            Cell::new(result.expected),
            status,
        ]);
    }
    table
}

/// Missing-value tallies. With `only_missing`, columns with zero missing
/// cells are left out.
pub fn missingness_table(records: &[MissingnessRecord], only_missing: bool) -> Table {
    let mut table = new_table(vec!["Column", "Missing", "Missing (%)"]);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for record in records {
        if only_missing && record.missing_count == 0 {
            continue;
        }
        table.add_row(vec![
            Cell::new(&record.column),
            Cell::new(record.missing_count),
            Cell::new(format!("{:.2}", record.missing_percentage)),
        ]);
    }
    table
}

/// Grouped summary statistics, one row per category.
pub fn stats_table(stats: &[GroupStats]) -> Table {
    let mut table = new_table(vec![
        "Category",
        "N",
        "Missing (%)",
        "Min",
        "Mean",
        "Q1",
        "Median",
        "Q3",
        "Max",
    ]);
    for idx in 1..9 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for group in stats {
        table.add_row(vec![
            Cell::new(&group.category),
            Cell::new(group.count),
            Cell::new(format!("{:.2}", group.missing_percentage)),
            numeric_cell(group.min),
            numeric_cell(group.mean),
            numeric_cell(group.q1),
            numeric_cell(group.median),
            numeric_cell(group.q3),
            numeric_cell(group.max),
        ]);
    }
    table
}

/// One name-to-category frequency table.
pub fn mapping_table(mapping: &NameCategoryTable) -> Table {
    let mut table = new_table(vec![
        mapping.name_column.as_str(),
        mapping.category_column.as_str(),
        "Count",
    ]);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in &mapping.entries {
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(&entry.category),
            Cell::new(entry.count),
        ]);
    }
    table
}

/// Outlier replacements per threshold row.
pub fn outlier_table(outcome: &OutlierOutcome) -> Table {
    let mut table = new_table(vec!["Category", "Lower", "Upper", "Outliers"]);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for detail in &outcome.details {
        let count = detail.values.len();
        let cell = if count == 0 {
            Cell::new("0").add_attribute(Attribute::Dim)
        } else {
            Cell::new(count).fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&detail.key),
            Cell::new(format_numeric(detail.lower)),
            Cell::new(format_numeric(detail.upper)),
            cell,
        ]);
    }
    table
}

/// Overlapping admission intervals.
pub fn overlap_table(overlaps: &[OverlapRecord]) -> Table {
    let mut table = new_table(vec![
        "Patient",
        "Location",
        "Category",
        "Overlapping Location",
        "Admission Start",
        "Admission End",
        "Next Admission Start",
    ]);
    for overlap in overlaps {
        table.add_row(vec![
            Cell::new(&overlap.patient_id),
            Cell::new(&overlap.location_name),
            Cell::new(&overlap.location_category),
            Cell::new(&overlap.overlapping_location),
            Cell::new(overlap.admission_start),
            Cell::new(overlap.admission_end),
            Cell::new(overlap.next_admission_start),
        ]);
    }
    table
}

/// Final per-table summary: findings, then recommendations.
pub fn print_qc_summary(report: &QcReport) {
    println!("QC summary for {}", report.table);
    let mut table = new_table(vec!["Check", "Finding"]);
    for finding in &report.findings {
        table.add_row(vec![
            Cell::new(finding.check.as_str()).fg(Color::Cyan),
            Cell::new(&finding.message),
        ]);
    }
    println!("{table}");
    if !report.recommendations.is_empty() {
        println!("Recommendations:");
        for recommendation in &report.recommendations {
            println!("- {recommendation}");
        }
    }
}

fn new_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .into_iter()
            .map(|header| Cell::new(header).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn align_column(table: &mut Table, idx: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(idx) {
        column.set_cell_alignment(alignment);
    }
}

fn numeric_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(format!("{value:.2}")),
        None => Cell::new("-").add_attribute(Attribute::Dim),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clif_model::ColumnType;

    #[test]
    fn validation_table_has_one_row_per_result() {
        let results = vec![
            DtypeValidation {
                column: "lab_value".to_string(),
                actual: "str".to_string(),
                expected: ColumnType::String,
                status: DtypeStatus::Match,
            },
            DtypeValidation {
                column: "lab_order_dttm".to_string(),
                actual: "Not Found".to_string(),
                expected: ColumnType::Timestamp,
                status: DtypeStatus::Missing,
            },
        ];
        let table = validation_table(&results);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("lab_order_dttm"));
        assert!(rendered.contains("Not Found"));
    }

    #[test]
    fn missingness_table_can_filter_clean_columns() {
        let records = vec![
            MissingnessRecord {
                column: "a".to_string(),
                missing_count: 0,
                missing_percentage: 0.0,
            },
            MissingnessRecord {
                column: "b".to_string(),
                missing_count: 3,
                missing_percentage: 30.0,
            },
        ];
        assert_eq!(missingness_table(&records, false).row_count(), 2);
        assert_eq!(missingness_table(&records, true).row_count(), 1);
    }

    #[test]
    fn stats_table_renders_missing_summaries_as_dashes() {
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
        let rendered = stats_table(&stats).to_string();
        assert!(rendered.contains("sodium"));
        assert!(rendered.contains('-'));
    }
}
