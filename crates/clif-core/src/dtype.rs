//! Column type validation and coercion against a table schema.

use clif_ingest::{any_to_f64, any_to_i64, any_to_string_non_empty};
use clif_model::{
    ColumnType, DtypeStatus, DtypeValidation, QcError, RequiredColumns, Result, TableSchema,
};
use polars::prelude::{
    AnyValue, DataFrame, DataType, Int64Chunked, IntoSeries, NamedFrom, NewChunkedArray, Series,
    TimeUnit,
};
use tracing::warn;

use crate::timestamp::{cell_datetime, datetime_to_millis};

/// Validates each schema-declared column and coerces mismatched ones.
///
/// The frame is mutated in place. Cells that cannot be parsed to the
/// expected type degrade to null rather than aborting the column.
/// Results come back in schema declaration order.
pub fn validate_and_convert(
    schema: &TableSchema,
    data: &mut DataFrame,
) -> Result<Vec<DtypeValidation>> {
    let mut results = Vec::with_capacity(schema.columns.len());

    for spec in &schema.columns {
        let Ok(column) = data.column(&spec.name) else {
            results.push(DtypeValidation {
                column: spec.name.clone(),
                actual: "Not Found".to_string(),
                expected: spec.expected,
                status: DtypeStatus::Missing,
            });
            continue;
        };

        let actual = column.dtype().clone();
        if dtype_matches(&actual, spec.expected) {
            results.push(DtypeValidation {
                column: spec.name.clone(),
                actual: actual.to_string(),
                expected: spec.expected,
                status: DtypeStatus::Match,
            });
            continue;
        }

        results.push(DtypeValidation {
            column: spec.name.clone(),
            actual: actual.to_string(),
            expected: spec.expected,
            status: DtypeStatus::Mismatch,
        });
        coerce_column(data, &spec.name, spec.expected)?;
    }

    Ok(results)
}

/// Checks the schema's required columns against the frame.
pub fn check_required_columns(schema: &TableSchema, data: &DataFrame) -> RequiredColumns {
    let missing: Vec<String> = schema
        .required
        .iter()
        .filter(|name| data.column(name).is_err())
        .cloned()
        .collect();
    if missing.is_empty() {
        RequiredColumns::AllPresent
    } else {
        RequiredColumns::Missing(missing)
    }
}

fn dtype_matches(dtype: &DataType, expected: ColumnType) -> bool {
    match expected {
        ColumnType::String => matches!(dtype, DataType::String),
        ColumnType::Integer => dtype.is_integer(),
        ColumnType::Float => matches!(dtype, DataType::Float32 | DataType::Float64),
        ColumnType::Boolean => matches!(dtype, DataType::Boolean),
        ColumnType::Timestamp => matches!(dtype, DataType::Datetime(_, _) | DataType::Date),
    }
}

fn coerce_column(data: &mut DataFrame, name: &str, expected: ColumnType) -> Result<()> {
    match expected {
        ColumnType::Float => {
            let values = collect_cells(data, name, any_to_f64)?;
            data.with_column(Series::new(name.into(), values))
                .map_err(QcError::dataframe)?;
        }
        ColumnType::Integer => {
            let values = collect_cells(data, name, any_to_i64)?;
            data.with_column(Series::new(name.into(), values))
                .map_err(QcError::dataframe)?;
        }
        ColumnType::Timestamp => {
            let millis: Vec<Option<i64>> = {
                let column = data.column(name).map_err(QcError::dataframe)?;
                (0..data.height())
                    .map(|idx| {
                        let value = column.get(idx).unwrap_or(AnyValue::Null);
                        cell_datetime(&value).map(datetime_to_millis)
                    })
                    .collect()
            };
            let series = Int64Chunked::from_slice_options(name.into(), &millis)
                .into_datetime(TimeUnit::Milliseconds, None)
                .into_series();
            data.with_column(series).map_err(QcError::dataframe)?;
        }
        ColumnType::Boolean => cast_in_place(data, name, &DataType::Boolean),
        ColumnType::String => {
            let values: Vec<Option<String>> = {
                let column = data.column(name).map_err(QcError::dataframe)?;
                (0..data.height())
                    .map(|idx| any_to_string_non_empty(column.get(idx).unwrap_or(AnyValue::Null)))
                    .collect()
            };
            data.with_column(Series::new(name.into(), values))
                .map_err(QcError::dataframe)?;
        }
    }
    Ok(())
}

fn collect_cells<T>(
    data: &DataFrame,
    name: &str,
    convert: fn(AnyValue<'_>) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    let column = data.column(name).map_err(QcError::dataframe)?;
    Ok((0..data.height())
        .map(|idx| convert(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

/// Coercion failures here leave the column's prior values in place.
fn cast_in_place(data: &mut DataFrame, name: &str, dtype: &DataType) {
    let cast = match data.column(name) {
        Ok(column) => column.cast(dtype),
        Err(err) => {
            warn!(column = name, %err, "column disappeared during coercion");
            return;
        }
    };
    match cast {
        Ok(column) => {
            if let Err(err) = data.with_column(column) {
                warn!(column = name, %err, "unable to replace coerced column");
            }
        }
        Err(err) => warn!(column = name, ?dtype, %err, "cast failed; keeping prior values"),
    }
}
