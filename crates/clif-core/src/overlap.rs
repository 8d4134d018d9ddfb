//! Overlapping admission-interval detection for ADT-style data.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use clif_ingest::any_to_string_non_empty;
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One detected overlap between two adjacent stays of the same patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapRecord {
    pub patient_id: String,
    pub location_name: String,
    pub location_category: String,
    pub overlapping_location: String,
    pub admission_start: NaiveDateTime,
    pub admission_end: NaiveDateTime,
    pub next_admission_start: NaiveDateTime,
}

struct Stay {
    patient_id: String,
    location_name: String,
    location_category: String,
    in_dttm: NaiveDateTime,
    out_dttm: Option<NaiveDateTime>,
}

/// Scans admission intervals for overlapping stays at different locations.
///
/// Patient identity comes from a `patient_id` column when present,
/// otherwise from joining `hospitalization_id` against the
/// hospitalization lookup. Failure to derive a patient id for every row
/// is fatal for this check.
///
/// Only adjacent pairs in `(patient_id, in_dttm)` order are compared, so
/// a stay overlapping a non-adjacent stay goes undetected.
pub fn detect_overlaps(
    data: &DataFrame,
    hospitalization_lookup: Option<&DataFrame>,
) -> Result<Vec<OverlapRecord>> {
    let patient_ids = derive_patient_ids(data, hospitalization_lookup)?;
    let mut stays = collect_stays(data, &patient_ids).map_err(wrap)?;

    stays.sort_by(|a, b| {
        a.patient_id
            .cmp(&b.patient_id)
            .then_with(|| a.in_dttm.cmp(&b.in_dttm))
    });

    let mut overlaps = Vec::new();
    for pair in stays.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if current.patient_id != next.patient_id {
            continue;
        }
        let Some(out_dttm) = current.out_dttm else {
            continue;
        };
        if current.location_name != next.location_name && out_dttm > next.in_dttm {
            overlaps.push(OverlapRecord {
                patient_id: current.patient_id.clone(),
                location_name: current.location_name.clone(),
                location_category: current.location_category.clone(),
                overlapping_location: next.location_name.clone(),
                admission_start: current.in_dttm,
                admission_end: out_dttm,
                next_admission_start: next.in_dttm,
            });
        }
    }

    debug!(stays = stays.len(), overlaps = overlaps.len(), "overlap scan");
    Ok(overlaps)
}

fn derive_patient_ids(
    data: &DataFrame,
    hospitalization_lookup: Option<&DataFrame>,
) -> Result<Vec<Option<String>>> {
    if let Ok(column) = data.column("patient_id") {
        return Ok((0..data.height())
            .map(|idx| any_to_string_non_empty(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect());
    }

    let lookup = hospitalization_lookup.ok_or(QcError::EmptyHospitalizationLookup)?;
    if lookup.height() == 0 {
        return Err(QcError::EmptyHospitalizationLookup);
    }
    let by_hospitalization = hospitalization_map(lookup).map_err(wrap)?;

    let ids = data
        .column("hospitalization_id")
        .map_err(|_| QcError::PatientIdUnavailable("no hospitalization_id column".to_string()))?;
    let patient_ids: Vec<Option<String>> = (0..data.height())
        .map(|idx| {
            any_to_string_non_empty(ids.get(idx).unwrap_or(AnyValue::Null))
                .and_then(|id| by_hospitalization.get(&id).cloned())
        })
        .collect();

    if patient_ids.iter().all(Option::is_none) && data.height() > 0 {
        return Err(QcError::PatientIdUnavailable(
            "join against hospitalization table produced no patient ids".to_string(),
        ));
    }
    Ok(patient_ids)
}

fn hospitalization_map(lookup: &DataFrame) -> Result<HashMap<String, String>> {
    let hospitalization_ids = lookup
        .column("hospitalization_id")
        .map_err(QcError::dataframe)?;
    let patient_ids = lookup.column("patient_id").map_err(QcError::dataframe)?;
    let mut map = HashMap::with_capacity(lookup.height());
    for idx in 0..lookup.height() {
        let hospitalization =
            any_to_string_non_empty(hospitalization_ids.get(idx).unwrap_or(AnyValue::Null));
        let patient = any_to_string_non_empty(patient_ids.get(idx).unwrap_or(AnyValue::Null));
        if let (Some(hospitalization), Some(patient)) = (hospitalization, patient) {
            map.entry(hospitalization).or_insert(patient);
        }
    }
    Ok(map)
}

fn collect_stays(data: &DataFrame, patient_ids: &[Option<String>]) -> Result<Vec<Stay>> {
    let locations = data.column("location_name").map_err(QcError::dataframe)?;
    let categories = data
        .column("location_category")
        .map_err(QcError::dataframe)?;
    let in_dttms = data.column("in_dttm").map_err(QcError::dataframe)?;
    let out_dttms = data.column("out_dttm").map_err(QcError::dataframe)?;

    let mut stays = Vec::with_capacity(data.height());
    for (idx, patient_id) in patient_ids.iter().enumerate() {
        let Some(patient_id) = patient_id else {
            continue;
        };
        let Some(in_dttm) = crate::cell_datetime(&in_dttms.get(idx).unwrap_or(AnyValue::Null))
        else {
            continue;
        };
        stays.push(Stay {
            patient_id: patient_id.clone(),
            location_name: any_to_string_non_empty(locations.get(idx).unwrap_or(AnyValue::Null))
                .unwrap_or_default(),
            location_category: any_to_string_non_empty(
                categories.get(idx).unwrap_or(AnyValue::Null),
            )
            .unwrap_or_default(),
            in_dttm,
            out_dttm: crate::cell_datetime(&out_dttms.get(idx).unwrap_or(AnyValue::Null)),
        });
    }
    Ok(stays)
}

fn wrap(err: QcError) -> QcError {
    match err {
        already @ QcError::OverlapCheck(_) => already,
        other => QcError::OverlapCheck(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn adjacent_overlap_at_different_locations_is_reported() {
        let frame = df! {
            "patient_id" => ["P1", "P1"],
            "location_name" => ["ER", "ICU"],
            "location_category" => ["ed", "icu"],
            "in_dttm" => ["2024-01-15 08:00:00", "2024-01-15 09:00:00"],
            "out_dttm" => ["2024-01-15 10:00:00", "2024-01-15 11:00:00"],
        }
        .unwrap();

        let overlaps = detect_overlaps(&frame, None).unwrap();
        assert_eq!(overlaps.len(), 1);
        let overlap = &overlaps[0];
        assert_eq!(overlap.patient_id, "P1");
        assert_eq!(overlap.location_name, "ER");
        assert_eq!(overlap.overlapping_location, "ICU");
        assert_eq!(overlap.admission_end.to_string(), "2024-01-15 10:00:00");
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let frame = df! {
            "patient_id" => ["P1", "P1"],
            "location_name" => ["ER", "ICU"],
            "location_category" => ["ed", "icu"],
            "in_dttm" => ["2024-01-15 08:00:00", "2024-01-15 09:00:00"],
            "out_dttm" => ["2024-01-15 09:00:00", "2024-01-15 10:00:00"],
        }
        .unwrap();
        assert!(detect_overlaps(&frame, None).unwrap().is_empty());
    }

    #[test]
    fn same_location_overlap_is_ignored() {
        let frame = df! {
            "patient_id" => ["P1", "P1"],
            "location_name" => ["ICU", "ICU"],
            "location_category" => ["icu", "icu"],
            "in_dttm" => ["2024-01-15 08:00:00", "2024-01-15 09:00:00"],
            "out_dttm" => ["2024-01-15 10:00:00", "2024-01-15 11:00:00"],
        }
        .unwrap();
        assert!(detect_overlaps(&frame, None).unwrap().is_empty());
    }

    #[test]
    fn patient_id_derives_through_hospitalization_join() {
        let frame = df! {
            "hospitalization_id" => ["H1", "H1"],
            "location_name" => ["ER", "ICU"],
            "location_category" => ["ed", "icu"],
            "in_dttm" => ["2024-01-15 08:00:00", "2024-01-15 09:00:00"],
            "out_dttm" => ["2024-01-15 10:00:00", "2024-01-15 11:00:00"],
        }
        .unwrap();
        let lookup = df! {
            "hospitalization_id" => ["H1"],
            "patient_id" => ["P1"],
        }
        .unwrap();

        let overlaps = detect_overlaps(&frame, Some(&lookup)).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].patient_id, "P1");
    }

    #[test]
    fn missing_lookup_is_fatal_without_patient_id() {
        let frame = df! {
            "hospitalization_id" => ["H1"],
            "location_name" => ["ER"],
            "location_category" => ["ed"],
            "in_dttm" => ["2024-01-15 08:00:00"],
            "out_dttm" => ["2024-01-15 10:00:00"],
        }
        .unwrap();
        assert!(matches!(
            detect_overlaps(&frame, None),
            Err(QcError::EmptyHospitalizationLookup)
        ));

        let empty_lookup = df! {
            "hospitalization_id" => Vec::<String>::new(),
            "patient_id" => Vec::<String>::new(),
        }
        .unwrap();
        assert!(matches!(
            detect_overlaps(&frame, Some(&empty_lookup)),
            Err(QcError::EmptyHospitalizationLookup)
        ));
    }

    #[test]
    fn unjoinable_rows_are_fatal() {
        let frame = df! {
            "hospitalization_id" => ["H9"],
            "location_name" => ["ER"],
            "location_category" => ["ed"],
            "in_dttm" => ["2024-01-15 08:00:00"],
            "out_dttm" => ["2024-01-15 10:00:00"],
        }
        .unwrap();
        let lookup = df! {
            "hospitalization_id" => ["H1"],
            "patient_id" => ["P1"],
        }
        .unwrap();
        assert!(matches!(
            detect_overlaps(&frame, Some(&lookup)),
            Err(QcError::PatientIdUnavailable(_))
        ));
    }
}
