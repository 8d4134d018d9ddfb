use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

/// Outcome of checking one schema column against the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtypeStatus {
    /// The column's physical type already matches the expected type.
    Match,
    /// The column exists but its type differs; coercion was attempted.
    Mismatch,
    /// The column is absent from the dataset.
    Missing,
}

impl DtypeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "Match",
            Self::Mismatch => "Mismatch",
            Self::Missing => "Missing",
        }
    }
}

impl std::fmt::Display for DtypeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record per schema-declared column, in schema declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtypeValidation {
    pub column: String,
    /// The dataset's dtype before any coercion ("Not Found" when missing).
    pub actual: String,
    pub expected: ColumnType,
    pub status: DtypeStatus,
}

/// Required-column check result.
///
/// Callers branch on structure rather than comparing formatted messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequiredColumns {
    AllPresent,
    Missing(Vec<String>),
}

impl RequiredColumns {
    pub fn is_all_present(&self) -> bool {
        matches!(self, Self::AllPresent)
    }

    pub fn missing(&self) -> &[String] {
        match self {
            Self::AllPresent => &[],
            Self::Missing(columns) => columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_columns_branches_on_structure() {
        let all = RequiredColumns::AllPresent;
        assert!(all.is_all_present());
        assert!(all.missing().is_empty());

        let some = RequiredColumns::Missing(vec!["in_dttm".to_string()]);
        assert!(!some.is_all_present());
        assert_eq!(some.missing(), ["in_dttm".to_string()]);
    }

    #[test]
    fn dtype_validation_serializes() {
        let record = DtypeValidation {
            column: "vital_value".to_string(),
            actual: "str".to_string(),
            expected: ColumnType::Float,
            status: DtypeStatus::Mismatch,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"float\""));
        assert!(json.contains("Mismatch"));
    }
}
