//! Per-run QC session context.
//!
//! Everything a table check needs, the session carries explicitly: the
//! schema registry, sampling options, threshold locations, and the
//! hospitalization lookup shared by checks that must derive patient ids.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::debug;

use clif_ingest::{read_dataset, read_threshold_table, ThresholdTable};
use clif_model::SchemaRegistry;

/// Options and shared lookups for one QC run.
pub struct QcSession {
    pub registry: SchemaRegistry,
    /// Fraction of rows kept before the first validation step.
    pub sample_fraction: f64,
    /// Seed for the sampling mask.
    pub seed: u64,
    /// Directory holding `<table>_outlier_thresholds.csv` files.
    pub thresholds_dir: Option<PathBuf>,
    /// Destination for artifacts and revised datasets.
    pub output_dir: Option<PathBuf>,
    /// Show every column in missingness output, not only the affected ones.
    pub show_all_missingness: bool,
    /// Write the coerced, deduplicated, outlier-nulled frame back out.
    pub export_revised: bool,
    hospitalization: Option<DataFrame>,
}

impl QcSession {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            sample_fraction: 1.0,
            seed: 42,
            thresholds_dir: None,
            output_dir: None,
            show_all_missingness: false,
            export_revised: false,
            hospitalization: None,
        }
    }

    /// Loads the hospitalization table used to derive patient ids, when
    /// the data directory ships one.
    pub fn load_hospitalization_lookup(&mut self, data_dir: &Path) -> Result<()> {
        for extension in ["csv", "parquet"] {
            let path = data_dir.join(format!("clif_hospitalization.{extension}"));
            if path.is_file() {
                let frame = read_dataset(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                debug!(rows = frame.height(), "loaded hospitalization lookup");
                self.hospitalization = Some(frame);
                return Ok(());
            }
        }
        Ok(())
    }

    pub fn hospitalization_lookup(&self) -> Option<&DataFrame> {
        self.hospitalization.as_ref()
    }

    /// Loads the outlier threshold table for `table`, if configured.
    pub fn thresholds_for(&self, table: &str, key_column: &str) -> Result<Option<ThresholdTable>> {
        let Some(dir) = &self.thresholds_dir else {
            return Ok(None);
        };
        let path = dir.join(format!("{}_outlier_thresholds.csv", table.to_lowercase()));
        if !path.is_file() {
            debug!(path = %path.display(), "no threshold file for table");
            return Ok(None);
        }
        let thresholds = read_threshold_table(&path, key_column)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Some(thresholds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn thresholds_require_a_configured_directory() {
        let session = QcSession::new(SchemaRegistry::embedded());
        assert!(session.thresholds_for("labs", "lab_category").unwrap().is_none());
    }

    #[test]
    fn thresholds_load_from_convention_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labs_outlier_thresholds.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "lab_category,lower_limit,upper_limit").unwrap();
        writeln!(file, "sodium,135,145").unwrap();
        drop(file);

        let mut session = QcSession::new(SchemaRegistry::embedded());
        session.thresholds_dir = Some(dir.path().to_path_buf());
        let thresholds = session.thresholds_for("Labs", "lab_category").unwrap().unwrap();
        assert_eq!(thresholds.rows.len(), 1);
    }
}
