//! Reconciling observed categorical values against a controlled vocabulary.

use clif_ingest::any_to_string_non_empty;
use clif_model::{QcError, Result};
use polars::prelude::{AnyValue, DataFrame};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SIMILARITY_THRESHOLD: f64 = 90.0;

/// A reference category matched to a close, but not verbatim, observed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarCategory {
    pub reference: String,
    pub closest: String,
    /// Partial-ratio similarity, 0 to 100.
    pub score: f64,
}

/// Outcome of a vocabulary reconciliation pass.
///
/// Reference categories present verbatim (case-folded) appear in neither
/// list; every other reference category lands in exactly one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    pub similar: Vec<SimilarCategory>,
    pub missing: Vec<String>,
}

/// Compares the reference vocabulary against the observed values of
/// `category_column`.
///
/// Ties between equally scoring observed values go to the first
/// encountered in the column's row order; callers should not rely on a
/// specific winner among ties.
pub fn reconcile(
    data: &DataFrame,
    reference_categories: &[String],
    category_column: &str,
) -> Result<Reconciliation> {
    let observed = distinct_lowercase(data, category_column)?;
    let mut outcome = Reconciliation::default();

    for reference in reference_categories {
        let folded = reference.to_lowercase();
        if observed.iter().any(|value| *value == folded) {
            continue;
        }
        match closest_match(&folded, &observed) {
            Some((closest, score)) if score >= SIMILARITY_THRESHOLD => {
                debug!(reference, closest, score, "near-match category");
                outcome.similar.push(SimilarCategory {
                    reference: reference.clone(),
                    closest: closest.to_string(),
                    score,
                });
            }
            _ => outcome.missing.push(reference.clone()),
        }
    }

    Ok(outcome)
}

/// Distinct values of a string column, lowercased, in first-encounter order.
fn distinct_lowercase(data: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = data
        .column(column)
        .map_err(|_| QcError::ColumnNotFound(column.to_string()))?;
    let mut seen = std::collections::HashSet::new();
    let mut values = Vec::new();
    for idx in 0..data.height() {
        let Some(value) = any_to_string_non_empty(series.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let folded = value.to_lowercase();
        if seen.insert(folded.clone()) {
            values.push(folded);
        }
    }
    Ok(values)
}

fn closest_match<'a>(reference: &str, observed: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for value in observed {
        let score = partial_ratio(reference, value);
        if best.map(|(_, prev)| score > prev).unwrap_or(true) {
            best = Some((value, score));
        }
    }
    best
}

/// Partial-ratio similarity on a 0 to 100 scale.
///
/// Slides the shorter string across the longer and keeps the best
/// window's full-ratio score, tolerating extra surrounding text.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() && b_chars.is_empty() {
        return 100.0;
    }
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0.0;
    }
    let (shorter, longer) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    let window = shorter.len();
    let mut best: f64 = 0.0;
    for start in 0..=(longer.len() - window) {
        let slice = &longer[start..start + window];
        let score = rapidfuzz::fuzz::ratio(shorter.iter().copied(), slice.iter().copied()) * 100.0;
        if score > best {
            best = score;
        }
        if best >= 100.0 {
            break;
        }
    }
    best
}
