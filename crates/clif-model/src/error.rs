use std::fmt::Display;

use thiserror::Error;

/// Errors raised by the QC engine.
///
/// Only conditions that make a check meaningless are errors; data-quality
/// problems (mismatched types, outliers, missing categories) are reported
/// as findings, never raised.
#[derive(Debug, Error)]
pub enum QcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The requested table has no entry in the schema registry.
    #[error("unknown table '{0}'")]
    UnknownTable(String),
    /// A threshold row (or check input) names a column the dataset lacks.
    #[error("column not found: '{0}'")]
    ColumnNotFound(String),
    #[error("hospitalization table is empty or not provided")]
    EmptyHospitalizationLookup,
    #[error("unable to derive patient_id: {0}")]
    PatientIdUnavailable(String),
    #[error("unsupported file type '{0}' (expected 'csv' or 'parquet')")]
    UnsupportedFileType(String),
    #[error("error checking time overlap: {0}")]
    OverlapCheck(String),
    #[error("dataframe error: {0}")]
    DataFrame(String),
    #[error("{0}")]
    Message(String),
}

impl QcError {
    /// Wraps a polars (or other backend) failure without pulling the
    /// dataframe crate into the model.
    pub fn dataframe(err: impl Display) -> Self {
        Self::DataFrame(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QcError>;
