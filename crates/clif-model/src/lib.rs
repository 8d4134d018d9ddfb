//! Core data model for CLIF QC: embedded table schemas, validation
//! results, structured findings, and the shared error type.

mod error;
mod report;
mod schema;
mod validation;

pub use error::{QcError, Result};
pub use report::{CheckKind, QcFinding, QcReport};
pub use schema::{ColumnSpec, ColumnType, SchemaRegistry, TableSchema};
pub use validation::{DtypeStatus, DtypeValidation, RequiredColumns};
