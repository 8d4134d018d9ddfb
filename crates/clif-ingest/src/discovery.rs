//! Locating CLIF table files in a data directory.
//!
//! Datasets follow the `clif_<table>.<ext>` naming convention, one file
//! per table, with `csv` or `parquet` extensions.

use std::path::{Path, PathBuf};

use clif_model::Result;
use tracing::debug;

use crate::read::FileType;

const FILE_PREFIX: &str = "clif_";

/// Extracts the table name from a `clif_<table>.<ext>` path.
///
/// Returns `None` for files outside the naming convention or with an
/// unsupported extension.
pub fn table_for_file(path: &Path) -> Option<String> {
    FileType::from_path(path).ok()?;
    let stem = path.file_stem()?.to_str()?;
    let table = stem.strip_prefix(FILE_PREFIX)?;
    if table.is_empty() {
        return None;
    }
    Some(table.to_ascii_lowercase())
}

/// Scans a directory for CLIF table files.
///
/// Returns `(table, path)` pairs sorted by table name. Files that do not
/// follow the naming convention are ignored.
pub fn discover_table_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(table) = table_for_file(&path) {
            found.push((table, path));
        }
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(dir = %dir.display(), tables = found.len(), "discovered table files");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn extracts_table_names_from_convention() {
        assert_eq!(
            table_for_file(Path::new("/data/clif_labs.csv")),
            Some("labs".to_string())
        );
        assert_eq!(
            table_for_file(Path::new("/data/CLIF_ADT.parquet")),
            None,
            "prefix matching is case-sensitive"
        );
        assert_eq!(table_for_file(Path::new("/data/clif_adt.xlsx")), None);
        assert_eq!(table_for_file(Path::new("/data/readme.md")), None);
    }

    #[test]
    fn scans_a_directory_in_table_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["clif_vitals.csv", "clif_adt.parquet", "notes.txt"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let found = discover_table_files(dir.path()).unwrap();
        let tables: Vec<&str> = found.iter().map(|(table, _)| table.as_str()).collect();
        assert_eq!(tables, ["adt", "vitals"]);
    }
}
