//! CLIF table schema registry.
//!
//! Each CLIF table declares its required columns and the expected semantic
//! type of every known column. The registry is embedded configuration,
//! loaded once at process start and consumed read-only by the validators.

use serde::{Deserialize, Serialize};

/// Semantic type tag for a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column declaration within a table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub expected: ColumnType,
}

/// Schema for a single CLIF table.
///
/// `columns` preserves declaration order; type-validation results are
/// emitted in this order regardless of the dataset's column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub required: Vec<String>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .iter()
            .any(|required| required.eq_ignore_ascii_case(name))
    }
}

/// Registry of all CLIF table schemas.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    tables: Vec<TableSchema>,
}

impl SchemaRegistry {
    /// Builds the embedded registry for the eleven CLIF tables.
    pub fn embedded() -> Self {
        Self {
            tables: vec![
                labs(),
                vitals(),
                respiratory_support(),
                medication_admin_continuous(),
                adt(),
                hospitalization(),
                patient(),
                patient_assessments(),
                position(),
                microbiology_culture(),
                encounter_demographic_disposition(),
            ],
        }
    }

    /// Case-insensitive lookup by table name.
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables
            .iter()
            .find(|schema| schema.table.eq_ignore_ascii_case(name))
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|schema| schema.table.as_str()).collect()
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::embedded()
    }
}

fn col(name: &str, expected: ColumnType) -> ColumnSpec {
    ColumnSpec {
        name: name.to_string(),
        expected,
    }
}

fn schema(table: &str, columns: Vec<ColumnSpec>, required: &[&str]) -> TableSchema {
    TableSchema {
        table: table.to_string(),
        columns,
        required: required.iter().map(|name| (*name).to_string()).collect(),
    }
}

fn labs() -> TableSchema {
    use ColumnType::{String, Timestamp};
    schema(
        "Labs",
        vec![
            col("hospitalization_id", String),
            col("lab_order_dttm", Timestamp),
            col("lab_collect_dttm", Timestamp),
            col("lab_result_dttm", Timestamp),
            col("lab_order_name", String),
            col("lab_order_category", String),
            col("lab_name", String),
            col("lab_category", String),
            col("lab_value", String),
            col("reference_unit", String),
            col("lab_type_name", String),
            col("lab_specimen_name", String),
            col("lab_specimen_category", String),
            col("lab_loinc_code", String),
        ],
        &[
            "hospitalization_id",
            "lab_order_dttm",
            "lab_collect_dttm",
            "lab_result_dttm",
            "lab_order_name",
            "lab_order_category",
            "lab_name",
            "lab_category",
            "lab_value",
            "reference_unit",
            "lab_specimen_name",
            "lab_specimen_category",
            "lab_type_name",
            "lab_loinc_code",
        ],
    )
}

fn vitals() -> TableSchema {
    use ColumnType::{Float, String, Timestamp};
    schema(
        "Vitals",
        vec![
            col("hospitalization_id", String),
            col("recorded_dttm", Timestamp),
            col("vital_name", String),
            col("vital_category", String),
            col("vital_value", Float),
            col("meas_site_name", String),
        ],
        &[
            "hospitalization_id",
            "recorded_dttm",
            "vital_name",
            "vital_category",
            "vital_value",
            "meas_site_name",
        ],
    )
}

fn respiratory_support() -> TableSchema {
    use ColumnType::{Boolean, Float, String, Timestamp};
    let mut columns = vec![
        col("hospitalization_id", String),
        col("recorded_dttm", Timestamp),
        col("device_name", String),
        col("device_category", String),
        col("vent_brand_name", String),
        col("mode_name", String),
        col("mode_category", String),
        col("tracheostomy", Boolean),
    ];
    let numeric = [
        "lpm_set",
        "fio2_set",
        "tidal_volume_set",
        "resp_rate_set",
        "pressure_control_set",
        "pressure_support_set",
        "flow_rate_set",
        "peak_inspiratory_pressure_set",
        "inspiratory_time_set",
        "peep_set",
        "tidal_volume_obs",
        "resp_rate_obs",
        "plateau_pressure_obs",
        "peak_inspiratory_pressure_obs",
        "peep_obs",
        "minute_vent_obs",
        "mean_airway_pressure_obs",
    ];
    for name in numeric {
        columns.push(col(name, Float));
    }
    // Every respiratory support column is required.
    let required = columns.iter().map(|spec| spec.name.clone()).collect();
    TableSchema {
        table: "Respiratory_Support".to_string(),
        required,
        columns,
    }
}

fn medication_admin_continuous() -> TableSchema {
    use ColumnType::{Float, String, Timestamp};
    schema(
        "Medication_admin_continuous",
        vec![
            col("hospitalization_id", String),
            col("med_order_id", String),
            col("admin_dttm", Timestamp),
            col("med_name", String),
            col("med_category", String),
            col("med_group", String),
            col("med_route_name", String),
            col("med_route_category", String),
            col("med_dose", Float),
            col("med_dose_unit", String),
            col("mar_action_name", String),
            col("mar_action_category", String),
        ],
        &[
            "hospitalization_id",
            "med_order_id",
            "admin_dttm",
            "med_name",
            "med_category",
            "med_group",
            "med_route_name",
            "med_route_category",
            "med_dose",
            "med_dose_unit",
            "mar_action_name",
            "mar_action_category",
        ],
    )
}

fn adt() -> TableSchema {
    use ColumnType::{String, Timestamp};
    schema(
        "ADT",
        vec![
            col("patient_id", String),
            col("hospitalization_id", String),
            col("hospital_id", String),
            col("in_dttm", Timestamp),
            col("out_dttm", Timestamp),
            col("location_name", String),
            col("location_category", String),
        ],
        &[
            "patient_id",
            "hospitalization_id",
            "hospital_id",
            "in_dttm",
            "out_dttm",
            "location_name",
            "location_category",
        ],
    )
}

fn hospitalization() -> TableSchema {
    use ColumnType::{Integer, String, Timestamp};
    schema(
        "Hospitalization",
        vec![
            col("patient_id", String),
            col("hospitalization_id", String),
            col("hospitalization_joined_id", String),
            col("admission_dttm", Timestamp),
            col("discharge_dttm", Timestamp),
            col("age_at_admission", Integer),
            col("admission_type_name", String),
            col("admission_type_category", String),
            col("discharge_name", String),
            col("discharge_category", String),
            col("zipcode_nine_digit", String),
            col("zipcode_five_digit", String),
            col("census_block_code", String),
            col("census_block_group_code", String),
            col("census_tract", String),
            col("state_code", String),
            col("county_code", String),
        ],
        &[
            "patient_id",
            "hospitalization_id",
            "hospitalization_joined_id",
            "admission_dttm",
            "discharge_dttm",
            "age_at_admission",
            "admission_type_name",
            "admission_type_category",
            "discharge_name",
            "discharge_category",
            "zipcode_nine_digit",
            "zipcode_five_digit",
            "census_block_code",
            "census_block_group_code",
            "census_tract",
            "state_code",
            "county_code",
        ],
    )
}

fn patient() -> TableSchema {
    use ColumnType::{String, Timestamp};
    schema(
        "Patient",
        vec![
            col("patient_id", String),
            col("race_name", String),
            col("race_category", String),
            col("ethnicity_name", String),
            col("ethnicity_category", String),
            col("sex_name", String),
            col("sex_category", String),
            col("birth_date", Timestamp),
            col("death_dttm", Timestamp),
            col("language_name", String),
            col("language_category", String),
        ],
        &[
            "patient_id",
            "race_name",
            "race_category",
            "ethnicity_name",
            "ethnicity_category",
            "sex_name",
            "sex_category",
            "birth_date",
            "death_dttm",
            "language_name",
            "language_category",
        ],
    )
}

fn patient_assessments() -> TableSchema {
    use ColumnType::{Float, String, Timestamp};
    schema(
        "Patient_Assessments",
        vec![
            col("hospitalization_id", String),
            col("recorded_dttm", Timestamp),
            col("assessment_name", String),
            col("assessment_category", String),
            col("assessment_group", String),
            col("numerical_value", Float),
            col("categorical_value", String),
            col("text_value", String),
        ],
        &[
            "hospitalization_id",
            "recorded_dttm",
            "assessment_name",
            "assessment_category",
            "assessment_group",
            "numerical_value",
            "categorical_value",
            "text_value",
        ],
    )
}

fn position() -> TableSchema {
    use ColumnType::{String, Timestamp};
    schema(
        "Position",
        vec![
            col("patient_id", String),
            col("hospitalization_id", String),
            col("recorded_dttm", Timestamp),
            col("position_name", String),
            col("position_category", String),
        ],
        &[
            "patient_id",
            "hospitalization_id",
            "recorded_dttm",
            "position_name",
            "position_category",
        ],
    )
}

fn microbiology_culture() -> TableSchema {
    use ColumnType::{String, Timestamp};
    schema(
        "Microbiology_Culture",
        vec![
            col("hospitalization_id", String),
            col("organism_id", String),
            col("order_dttm", Timestamp),
            col("collect_dttm", Timestamp),
            col("result_dttm", Timestamp),
            col("fluid_name", String),
            col("fluid_category", String),
            col("component_name", String),
            col("component_category", String),
            col("organism_name", String),
            col("organism_category", String),
        ],
        &[
            "hospitalization_id",
            "organism_id",
            "order_dttm",
            "collect_dttm",
            "result_dttm",
            "fluid_name",
            "fluid_category",
            "component_name",
            "component_category",
            "organism_name",
            "organism_category",
        ],
    )
}

fn encounter_demographic_disposition() -> TableSchema {
    use ColumnType::{Integer, String};
    schema(
        "Encounter_Demographic_Disposition",
        vec![
            col("encounter_id", String),
            col("age_at_admission", Integer),
            col("disposition_name", String),
            col("disposition_category", String),
        ],
        &[
            "encounter_id",
            "age_at_admission",
            "disposition_name",
            "disposition_category",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_all_clif_tables() {
        let registry = SchemaRegistry::embedded();
        assert_eq!(registry.tables().len(), 11);
        for name in ["Labs", "Vitals", "ADT", "Respiratory_Support"] {
            assert!(registry.table(name).is_some(), "missing schema for {name}");
        }
    }

    #[test]
    fn table_lookup_is_case_insensitive() {
        let registry = SchemaRegistry::embedded();
        assert!(registry.table("labs").is_some());
        assert!(registry.table("ADT").is_some());
        assert!(registry.table("adt").is_some());
        assert!(registry.table("NotATable").is_none());
    }

    #[test]
    fn labs_schema_declares_timestamps() {
        let registry = SchemaRegistry::embedded();
        let labs = registry.table("Labs").unwrap();
        let spec = labs.column("lab_order_dttm").unwrap();
        assert_eq!(spec.expected, ColumnType::Timestamp);
        assert_eq!(labs.column("lab_value").unwrap().expected, ColumnType::String);
        assert!(labs.is_required("lab_value"));
    }
}
