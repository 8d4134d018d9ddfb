use serde::{Deserialize, Serialize};

/// Which QC check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Duplicates,
    DataTypes,
    Missingness,
    RequiredColumns,
    NumericDerivation,
    Categories,
    Outliers,
    SummaryStats,
    Mapping,
    Overlaps,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::DataTypes => "data_types",
            Self::Missingness => "missingness",
            Self::RequiredColumns => "required_columns",
            Self::NumericDerivation => "numeric_derivation",
            Self::Categories => "categories",
            Self::Outliers => "outliers",
            Self::SummaryStats => "summary_stats",
            Self::Mapping => "mapping",
            Self::Overlaps => "overlaps",
        }
    }
}

/// A single data-quality finding. Findings are diagnostics, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcFinding {
    pub check: CheckKind,
    pub message: String,
}

/// Accumulated findings and recommendations for one table's QC pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QcReport {
    pub table: String,
    pub findings: Vec<QcFinding>,
    pub recommendations: Vec<String>,
}

impl QcReport {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            findings: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    pub fn add_finding(&mut self, check: CheckKind, message: impl Into<String>) {
        self.findings.push(QcFinding {
            check,
            message: message.into(),
        });
    }

    pub fn recommend(&mut self, message: impl Into<String>) {
        self.recommendations.push(message.into());
    }

    pub fn findings_for(&self, check: CheckKind) -> impl Iterator<Item = &QcFinding> {
        self.findings
            .iter()
            .filter(move |finding| finding.check == check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accumulates_findings_in_order() {
        let mut report = QcReport::new("Labs");
        report.add_finding(CheckKind::Duplicates, "3 duplicate(s) found");
        report.add_finding(CheckKind::Outliers, "2 outlier(s) in sodium");
        report.recommend("Review and remove duplicates.");

        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.findings[0].check, CheckKind::Duplicates);
        assert_eq!(report.findings_for(CheckKind::Outliers).count(), 1);
        assert_eq!(report.recommendations.len(), 1);
    }
}
