pub mod discovery;
pub mod polars_utils;
pub mod read;
pub mod thresholds;

pub use discovery::{discover_table_files, table_for_file};
pub use polars_utils::{
    any_to_datetime, any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty,
    format_numeric, is_missing_value, parse_f64, parse_i64,
};
pub use read::{FileType, read_dataset, read_dataset_with_type};
pub use thresholds::{ThresholdRow, ThresholdTable, read_threshold_table};
