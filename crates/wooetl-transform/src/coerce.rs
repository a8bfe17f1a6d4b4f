//! Schema-driven type coercion.
//!
//! Casts every declared column of every row to its warehouse type and
//! projects the row onto the declared columns (keys not in the schema are
//! dropped). Rows are `serde_json` maps, so output keys come out sorted by
//! name rather than in declaration order.
//!
//! A value that cannot be cast is recorded as a [`CoercionFailure`] naming
//! the row and column path instead of aborting on the first problem, so a
//! `validate` run can list everything at once.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde_json::{Number, Value};
use wooetl_core::{ColumnMode, ColumnSpec, ColumnType};

use crate::error::TransformError;
use crate::Row;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One value that could not be cast to its column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    /// Zero-based index of the row in the batch.
    pub row: usize,
    /// Column path, e.g. `total` or `line_items[1].quantity`.
    pub column: String,
    pub reason: String,
}

impl fmt::Display for CoercionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column {}: {}", self.row, self.column, self.reason)
    }
}

/// Coerced rows plus every failure found along the way.
///
/// Rows are always returned; a failed value is replaced by `null` so the
/// remaining columns can still be inspected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoercionOutcome {
    pub rows: Vec<Row>,
    pub failures: Vec<CoercionFailure>,
}

impl CoercionOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the rows if no value failed.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Coercion`] carrying every failure otherwise.
    pub fn into_rows(self) -> Result<Vec<Row>, TransformError> {
        if self.failures.is_empty() {
            Ok(self.rows)
        } else {
            Err(TransformError::Coercion {
                failures: self.failures,
            })
        }
    }
}

/// Coerces every row of `batch` against `columns`.
#[must_use]
pub fn coerce_batch(batch: &[Row], columns: &[ColumnSpec]) -> CoercionOutcome {
    let mut outcome = CoercionOutcome {
        rows: Vec::with_capacity(batch.len()),
        failures: Vec::new(),
    };

    for (index, row) in batch.iter().enumerate() {
        let mut errors = Vec::new();
        outcome.rows.push(coerce_row(row, columns, &mut errors));
        outcome
            .failures
            .extend(errors.into_iter().map(|(column, reason)| CoercionFailure {
                row: index,
                column,
                reason,
            }));
    }

    outcome
}

/// Coerces a single value to `spec`, honoring its mode.
///
/// # Errors
///
/// Returns one `(path, reason)` pair per failing leaf value. Paths are
/// relative to `spec.name`.
pub fn coerce_value(value: &Value, spec: &ColumnSpec) -> Result<Value, Vec<(String, String)>> {
    let mut errors = Vec::new();
    let coerced = coerce_field(value, spec, &spec.name, &mut errors);
    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

fn coerce_row(row: &Row, columns: &[ColumnSpec], errors: &mut Vec<(String, String)>) -> Row {
    columns
        .iter()
        .map(|spec| {
            let value = row.get(&spec.name).unwrap_or(&Value::Null);
            (spec.name.clone(), coerce_field(value, spec, &spec.name, errors))
        })
        .collect()
}

fn coerce_field(
    value: &Value,
    spec: &ColumnSpec,
    path: &str,
    errors: &mut Vec<(String, String)>,
) -> Value {
    match (spec.mode, value) {
        (ColumnMode::Repeated, Value::Null) => Value::Array(Vec::new()),
        (ColumnMode::Repeated, Value::Array(elements)) => Value::Array(
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| coerce_single(element, spec, &format!("{path}[{i}]"), errors))
                .collect(),
        ),
        (ColumnMode::Repeated, other) => {
            errors.push((path.to_owned(), format!("expected an array, found {}", kind(other))));
            Value::Array(Vec::new())
        }
        (ColumnMode::Required, Value::Null) => {
            errors.push((path.to_owned(), "required value is missing".to_owned()));
            Value::Null
        }
        (ColumnMode::Nullable, Value::Null) => Value::Null,
        (_, value) => coerce_single(value, spec, path, errors),
    }
}

fn coerce_single(
    value: &Value,
    spec: &ColumnSpec,
    path: &str,
    errors: &mut Vec<(String, String)>,
) -> Value {
    if spec.column_type == ColumnType::Record {
        let Value::Object(record) = value else {
            errors.push((path.to_owned(), format!("expected a record, found {}", kind(value))));
            return Value::Null;
        };
        let fields: Row = spec
            .fields
            .iter()
            .map(|field| {
                let child = record.get(&field.name).unwrap_or(&Value::Null);
                let child_path = format!("{path}.{}", field.name);
                (field.name.clone(), coerce_field(child, field, &child_path, errors))
            })
            .collect();
        return Value::Object(fields);
    }

    match coerce_scalar(value, spec.column_type) {
        Ok(coerced) => coerced,
        Err(reason) => {
            errors.push((path.to_owned(), reason));
            Value::Null
        }
    }
}

/// Casts a non-null scalar to `column_type`.
///
/// # Errors
///
/// Returns a human-readable reason when the value cannot be represented.
pub fn coerce_scalar(value: &Value, column_type: ColumnType) -> Result<Value, String> {
    match column_type {
        ColumnType::Integer => to_integer(value),
        ColumnType::Float => to_float(value),
        ColumnType::Boolean => to_boolean(value),
        ColumnType::String => Ok(Value::String(to_text(value))),
        ColumnType::DateTime => to_datetime(value),
        ColumnType::Record => Err(format!("cannot coerce {} to a record", kind(value))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn to_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Value::from(i));
            }
            if n.is_u64() {
                return Err(format!("{n} is out of range for an integer"));
            }
            let f = n.as_f64().unwrap_or(f64::NAN);
            if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(Value::from(f as i64))
            } else {
                Err(format!("{n} is not a whole number"))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{s}' is not an integer")),
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        other => Err(format!("cannot coerce {} to integer", kind(other))),
    }
}

fn to_float(value: &Value) -> Result<Value, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => return Err(format!("cannot coerce {} to float", kind(other))),
    };

    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("{value} is not a finite number"))
}

fn to_boolean(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(format!("{n} is not a boolean")),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(format!("cannot coerce {} to boolean", kind(other))),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_datetime(value: &Value) -> Result<Value, String> {
    let Value::String(s) = value else {
        return Err(format!("cannot coerce {} to datetime", kind(value)));
    };

    let parsed = parse_datetime(s.trim()).ok_or_else(|| format!("'{s}' is not a datetime"))?;
    // The warehouse stores microsecond precision.
    let micros = parsed
        .with_nanosecond(parsed.nanosecond() / 1_000 * 1_000)
        .unwrap_or(parsed);
    Ok(Value::String(micros.format(OUTPUT_DATETIME_FORMAT).to_string()))
}

/// Parses WooCommerce timestamps and the common variants around them.
///
/// Offset-qualified values are converted to UTC and the offset dropped;
/// date-only values resolve to midnight.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(s) {
        return Some(with_offset.naive_utc());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "coerce_test.rs"]
mod tests;
