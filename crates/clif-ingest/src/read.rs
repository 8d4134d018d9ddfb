//! Dataset loading for CSV and Parquet files.

use std::fs::File;
use std::path::Path;

use clif_model::{QcError, Result};
use polars::prelude::{CsvReadOptions, DataFrame, ParquetReader, SerReader};
use tracing::debug;

/// Supported on-disk dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Parquet,
}

impl FileType {
    /// Resolves a file-type label ("csv" or "parquet", case-insensitive).
    pub fn parse(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            other => Err(QcError::UnsupportedFileType(other.to_string())),
        }
    }

    /// Resolves a file type from a path extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::parse(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Loads a dataset, inferring the format from the file extension.
pub fn read_dataset(path: &Path) -> Result<DataFrame> {
    read_dataset_with_type(path, FileType::from_path(path)?)
}

/// Loads a dataset with an explicit format.
pub fn read_dataset_with_type(path: &Path, file_type: FileType) -> Result<DataFrame> {
    let frame = match file_type {
        FileType::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10_000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(QcError::dataframe)?
            .finish()
            .map_err(QcError::dataframe)?,
        FileType::Parquet => {
            let file = File::open(path)?;
            ParquetReader::new(file).finish().map_err(QcError::dataframe)?
        }
    };
    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "loaded dataset"
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_rejects_unknown_file_types() {
        assert_eq!(FileType::parse("CSV").unwrap(), FileType::Csv);
        assert_eq!(FileType::parse("parquet").unwrap(), FileType::Parquet);
        assert!(matches!(
            FileType::parse("xlsx"),
            Err(QcError::UnsupportedFileType(label)) if label == "xlsx"
        ));
    }

    #[test]
    fn reads_csv_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clif_vitals.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "hospitalization_id,vital_category,vital_value").unwrap();
        writeln!(file, "H001,heart_rate,72.0").unwrap();
        writeln!(file, "H002,sbp,121.5").unwrap();
        drop(file);

        let frame = read_dataset(&path).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 3);
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let path = Path::new("/tmp/clif_vitals.feather");
        assert!(read_dataset(path).is_err());
    }
}
