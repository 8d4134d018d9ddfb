//! Revised dataset export.
//!
//! After coercion, deduplication, and outlier-nulling, the working frame
//! can be written back out in either supported format.

use std::fs::File;
use std::path::{Path, PathBuf};

use clif_ingest::FileType;
use clif_model::{QcError, Result};
use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use tracing::info;

/// Writes the revised frame as `<table>_revised.<ext>` under `output_dir`.
pub fn write_revised_dataset(
    data: &mut DataFrame,
    output_dir: &Path,
    table: &str,
    file_type: FileType,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!(
        "{}_revised.{}",
        table.to_lowercase(),
        file_type.extension()
    ));
    let file = File::create(&path)?;
    match file_type {
        FileType::Csv => CsvWriter::new(file)
            .include_header(true)
            .finish(data)
            .map_err(QcError::dataframe)?,
        FileType::Parquet => {
            ParquetWriter::new(file)
                .finish(data)
                .map_err(QcError::dataframe)?;
        }
    }
    info!(path = %path.display(), rows = data.height(), "exported revised dataset");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clif_ingest::read_dataset;
    use polars::prelude::df;

    #[test]
    fn csv_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut frame = df! {
            "hospitalization_id" => ["H1", "H2"],
            "vital_value" => [Some(72.0), None],
        }
        .unwrap();

        let path = write_revised_dataset(&mut frame, dir.path(), "Vitals", FileType::Csv).unwrap();
        assert!(path.ends_with("vitals_revised.csv"));
        let reloaded = read_dataset(&path).unwrap();
        assert_eq!(reloaded.height(), 2);
        assert_eq!(reloaded.width(), 2);
    }

    #[test]
    fn parquet_export_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut frame = df! { "lab_value_numeric" => [140.0, 138.5] }.unwrap();
        let path =
            write_revised_dataset(&mut frame, dir.path(), "Labs", FileType::Parquet).unwrap();
        let reloaded = read_dataset(&path).unwrap();
        assert!(frame.equals_missing(&reloaded));
    }
}
