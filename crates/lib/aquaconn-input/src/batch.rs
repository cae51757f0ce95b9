use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int32Type, Int64Type, UInt64Type};

use crate::error::{InputError, Result};

/// Fetches a column and casts it to `data_type`, so that files written with a different
/// integer or float width still load.
fn column_as(col_name: &str, record_batch: &RecordBatch, data_type: &DataType) -> Result<ArrayRef> {
    let column = record_batch
        .column_by_name(col_name)
        .ok_or_else(|| InputError::MissingColumn(col_name.to_string()))?;
    if column.data_type() == data_type {
        return Ok(column.clone());
    }
    Ok(cast(column, data_type)?)
}

fn null_error(col_name: &str, row: usize) -> InputError {
    InputError::NullValue {
        column: col_name.to_string(),
        row,
    }
}

pub fn read_u64_column(col_name: &str, record_batch: &RecordBatch) -> Result<Vec<u64>> {
    let column = column_as(col_name, record_batch, &DataType::UInt64)?;
    column
        .as_primitive::<UInt64Type>()
        .iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(col_name, row)))
        .collect()
}

pub fn read_i64_column(col_name: &str, record_batch: &RecordBatch) -> Result<Vec<i64>> {
    let column = column_as(col_name, record_batch, &DataType::Int64)?;
    column
        .as_primitive::<Int64Type>()
        .iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(col_name, row)))
        .collect()
}

/// Reads a float column where nulls (masked values) become NaN.
pub fn read_f64_column(col_name: &str, record_batch: &RecordBatch) -> Result<Vec<f64>> {
    let column = column_as(col_name, record_batch, &DataType::Float64)?;
    Ok(column
        .as_primitive::<Float64Type>()
        .iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .collect())
}

/// Reads an integer column, substituting `null_value` for nulls.
pub fn read_i32_column_or(
    col_name: &str,
    record_batch: &RecordBatch,
    null_value: i32,
) -> Result<Vec<i32>> {
    let column = column_as(col_name, record_batch, &DataType::Int32)?;
    Ok(column
        .as_primitive::<Int32Type>()
        .iter()
        .map(|value| value.unwrap_or(null_value))
        .collect())
}
