//! Full pipeline runs over fixture files.

use std::io::Write;
use std::path::Path;

use clif_cli::pipeline::{run_directory, run_table};
use clif_cli::session::QcSession;
use clif_model::{CheckKind, SchemaRegistry};

fn write_file(dir: &Path, name: &str, contents: &str) {
    let mut file = std::fs::File::create(dir.join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

fn labs_fixture(dir: &Path) {
    write_file(
        dir,
        "clif_labs.csv",
        "hospitalization_id,lab_category,lab_value\n\
         H1,sodium,140\n\
         H1,sodium,190\n\
         H1,sodium,12 mg/dL\n\
         H2,potassium,4.2\n\
         H2,potassium,4.2\n",
    );
}

#[test]
fn labs_run_covers_derivation_and_outliers() {
    let data_dir = tempfile::tempdir().unwrap();
    labs_fixture(data_dir.path());
    let thresholds_dir = tempfile::tempdir().unwrap();
    write_file(
        thresholds_dir.path(),
        "labs_outlier_thresholds.csv",
        "lab_category,lower_limit,upper_limit\nsodium,135,145\npotassium,2.5,7.0\n",
    );

    let mut session = QcSession::new(SchemaRegistry::embedded());
    session.thresholds_dir = Some(thresholds_dir.path().to_path_buf());

    let outcome = run_table(&session, "labs", &data_dir.path().join("clif_labs.csv")).unwrap();
    let report = &outcome.report;
    assert_eq!(report.table, "Labs");

    let derivation = report
        .findings_for(CheckKind::NumericDerivation)
        .next()
        .unwrap();
    assert!(derivation.message.starts_with("1 non-numeric"));

    let outliers = report.findings_for(CheckKind::Outliers).next().unwrap();
    assert!(outliers.message.starts_with("1 outlier(s)"));

    // One exact duplicate row in the fixture.
    let duplicates = report.findings_for(CheckKind::Duplicates).next().unwrap();
    assert!(duplicates.message.starts_with("1 duplicate"));

    // The derived column exists on the returned frame.
    assert!(outcome.frame.column("lab_value_numeric").is_ok());
}

#[test]
fn adt_run_detects_overlaps_via_hospitalization_join() {
    let data_dir = tempfile::tempdir().unwrap();
    write_file(
        data_dir.path(),
        "clif_adt.csv",
        "hospitalization_id,hospital_id,in_dttm,out_dttm,location_name,location_category\n\
         H1,A,2024-01-15 08:00:00,2024-01-15 10:00:00,ER,ed\n\
         H1,A,2024-01-15 09:00:00,2024-01-15 11:00:00,ICU,icu\n",
    );
    write_file(
        data_dir.path(),
        "clif_hospitalization.csv",
        "hospitalization_id,patient_id\nH1,P1\n",
    );

    let mut session = QcSession::new(SchemaRegistry::embedded());
    session.load_hospitalization_lookup(data_dir.path()).unwrap();
    let outcome = run_table(&session, "adt", &data_dir.path().join("clif_adt.csv")).unwrap();
    let overlaps = outcome
        .report
        .findings_for(CheckKind::Overlaps)
        .next()
        .unwrap();
    assert!(overlaps.message.starts_with("1 overlapping"));
}

#[test]
fn directory_run_produces_one_report_per_known_table() {
    let data_dir = tempfile::tempdir().unwrap();
    labs_fixture(data_dir.path());
    write_file(
        data_dir.path(),
        "clif_vitals.csv",
        "hospitalization_id,recorded_dttm,vital_name,vital_category,vital_value,meas_site_name\n\
         H1,2024-01-15 08:00:00,HR,heart_rate,72,arm\n",
    );
    write_file(data_dir.path(), "notes.txt", "not a table\n");

    let output_dir = tempfile::tempdir().unwrap();
    let mut session = QcSession::new(SchemaRegistry::embedded());
    session.output_dir = Some(output_dir.path().to_path_buf());

    let reports = run_directory(&mut session, data_dir.path()).unwrap();
    let tables: Vec<&str> = reports.iter().map(|r| r.table.as_str()).collect();
    assert_eq!(tables, ["Labs", "Vitals"]);

    assert!(output_dir.path().join("qc_report.json").is_file());
    assert!(output_dir.path().join("labs_validation.csv").is_file());
    assert!(output_dir.path().join("vitals_missingness.csv").is_file());
}
