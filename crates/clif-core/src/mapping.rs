//! Name-to-category frequency tables.
//!
//! CLIF pairs free-text `*_name` columns with controlled `*_category`
//! columns; the frequency of each observed pairing is the raw material
//! for manual mapping review.

use std::collections::HashMap;

use clif_ingest::any_to_string_non_empty;
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};

const NAME_SUFFIX: &str = "_name";
const CATEGORY_SUFFIX: &str = "_category";

/// One observed `(name, category)` pairing and its row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingEntry {
    pub name: String,
    pub category: String,
    pub count: usize,
}

/// Frequency table for one `*_name` / `*_category` column pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameCategoryTable {
    pub name_column: String,
    pub category_column: String,
    /// Sorted by count descending.
    pub entries: Vec<MappingEntry>,
}

/// Builds a frequency table for every `*_name` column with a sibling
/// `*_category` column, in the frame's column order.
///
/// `*_name` columns without a sibling are skipped. Rows where either
/// cell is missing do not contribute.
pub fn map_names_to_categories(data: &DataFrame) -> Result<Vec<NameCategoryTable>> {
    let column_names: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut tables = Vec::new();
    for name_column in &column_names {
        let Some(prefix) = name_column.strip_suffix(NAME_SUFFIX) else {
            continue;
        };
        let category_column = format!("{prefix}{CATEGORY_SUFFIX}");
        if !column_names.contains(&category_column) {
            continue;
        }
        tables.push(frequency_table(data, name_column, &category_column)?);
    }
    Ok(tables)
}

fn frequency_table(
    data: &DataFrame,
    name_column: &str,
    category_column: &str,
) -> Result<NameCategoryTable> {
    let names = data.column(name_column).map_err(QcError::dataframe)?;
    let categories = data.column(category_column).map_err(QcError::dataframe)?;

    let mut counts: HashMap<(String, String), usize> = HashMap::new();
    for idx in 0..data.height() {
        let name = any_to_string_non_empty(names.get(idx).unwrap_or(AnyValue::Null));
        let category = any_to_string_non_empty(categories.get(idx).unwrap_or(AnyValue::Null));
        if let (Some(name), Some(category)) = (name, category) {
            *counts.entry((name, category)).or_default() += 1;
        }
    }

    let mut entries: Vec<MappingEntry> = counts
        .into_iter()
        .map(|((name, category), count)| MappingEntry {
            name,
            category,
            count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(NameCategoryTable {
        name_column: name_column.to_string(),
        category_column: category_column.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn builds_one_table_per_sibling_pair() {
        let frame = df! {
            "med_name" => ["Norepinephrine", "norepi gtt", "Norepinephrine"],
            "med_category" => ["norepinephrine", "norepinephrine", "norepinephrine"],
            "med_route_name" => ["IV", "IV", "IV"],
            // med_route_category missing on purpose.
            "mar_action_name" => ["Given", "Given", "Stopped"],
            "mar_action_category" => ["given", "given", "stopped"],
        }
        .unwrap();

        let tables = map_names_to_categories(&frame).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name_column, "med_name");
        assert_eq!(tables[1].name_column, "mar_action_name");

        let med = &tables[0];
        assert_eq!(med.entries.len(), 2);
        assert_eq!(med.entries[0].name, "Norepinephrine");
        assert_eq!(med.entries[0].count, 2);
        assert_eq!(med.entries[1].count, 1);
    }

    #[test]
    fn rows_with_missing_cells_do_not_contribute() {
        let frame = df! {
            "vital_name" => [Some("HR"), None, Some("HR")],
            "vital_category" => [Some("heart_rate"), Some("heart_rate"), None],
        }
        .unwrap();
        let tables = map_names_to_categories(&frame).unwrap();
        assert_eq!(tables[0].entries.len(), 1);
        assert_eq!(tables[0].entries[0].count, 1);
    }

    #[test]
    fn no_pairs_means_no_tables() {
        let frame = df! { "patient_id" => ["P1"] }.unwrap();
        assert!(map_names_to_categories(&frame).unwrap().is_empty());
    }
}
