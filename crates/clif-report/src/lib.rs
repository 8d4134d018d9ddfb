//! Presentation and export for QC results.
//!
//! Findings render as console tables; the same results can be written as
//! CSV artifacts, a versioned JSON report, or a revised copy of the
//! dataset with coercions and outlier-nulling applied.

pub mod artifacts;
pub mod export;
pub mod render;

pub use artifacts::{
    write_mapping_csv, write_missingness_csv, write_overlap_csv, write_report_json,
    write_stats_csv, write_validation_csv,
};
pub use export::write_revised_dataset;
pub use render::{
    mapping_table, missingness_table, outlier_table, overlap_table, print_qc_summary,
    stats_table, validation_table,
};
