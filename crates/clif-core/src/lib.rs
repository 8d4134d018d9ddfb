//! The CLIF QC engine.
//!
//! Operates on in-memory Polars frames: validates and coerces column
//! types against a table schema, analyzes missingness, reconciles
//! observed categories against controlled vocabularies, nulls values
//! outside clinically plausible ranges, derives name-to-category
//! frequency maps, computes grouped summary statistics, and detects
//! overlapping admission intervals.

pub mod dedupe;
pub mod derive;
pub mod dtype;
pub mod mapping;
pub mod missingness;
pub mod outliers;
pub mod overlap;
pub mod reconcile;
pub mod sample;
pub mod stats;
pub mod timestamp;

pub use dedupe::{count_duplicates, drop_duplicates};
pub use derive::derive_numeric_column;
pub use dtype::{check_required_columns, validate_and_convert};
pub use mapping::{MappingEntry, NameCategoryTable, map_names_to_categories};
pub use missingness::{MissingnessRecord, missingness};
pub use outliers::{OutlierDetail, OutlierOutcome, replace_outliers_long, replace_outliers_wide};
pub use overlap::{OverlapRecord, detect_overlaps};
pub use reconcile::{Reconciliation, SimilarCategory, partial_ratio, reconcile};
pub use sample::downsample;
pub use stats::{GroupStats, grouped_stats};
pub use timestamp::{cell_datetime, datetime_to_millis, parse_datetime};
