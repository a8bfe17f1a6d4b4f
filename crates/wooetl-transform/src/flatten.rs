//! Billing flattening.
//!
//! WooCommerce nests the customer's billing address under `billing`. The
//! destination table stores those fields as top-level columns, so every
//! `billing.*` key is promoted and `billing` is removed.

use std::collections::HashSet;

use serde_json::Value;
use wooetl_core::{ColumnMode, ColumnSpec, ColumnType};

use crate::Row;

/// Billing fields every WooCommerce store returns. Always promoted, even when
/// no order in the batch carries them, so downstream stages can rely on
/// `country` and `phone` existing.
pub const BILLING_FIELDS: [&str; 11] = [
    "first_name",
    "last_name",
    "company",
    "address_1",
    "address_2",
    "city",
    "state",
    "postcode",
    "country",
    "email",
    "phone",
];

/// Promotes `billing.*` to top-level columns for a whole batch.
///
/// The promoted column set is [`BILLING_FIELDS`] plus any other billing key
/// seen in the batch, so every output row has the same billing columns.
///
/// A missing or `null` value is filled with a sentinel matching the type the
/// column is declared with in `schema`: `""` for string and undeclared
/// columns, `[]` for repeated columns, `null` for every other type.
#[must_use]
pub fn flatten_billing(batch: Vec<Row>, schema: &[ColumnSpec]) -> Vec<Row> {
    let columns = billing_columns(&batch, schema);
    batch
        .into_iter()
        .map(|row| flatten_row(row, &columns))
        .collect()
}

/// Promoted column name paired with its fill value.
fn billing_columns(batch: &[Row], schema: &[ColumnSpec]) -> Vec<(String, Value)> {
    let mut names: Vec<String> = BILLING_FIELDS.iter().map(|f| (*f).to_string()).collect();
    let mut seen: HashSet<String> = names.iter().cloned().collect();

    for row in batch {
        if let Some(Value::Object(billing)) = row.get("billing") {
            for key in billing.keys() {
                if seen.insert(key.clone()) {
                    names.push(key.clone());
                }
            }
        }
    }

    names
        .into_iter()
        .map(|name| {
            let fill = sentinel(schema.iter().find(|c| c.name == name));
            (name, fill)
        })
        .collect()
}

fn sentinel(declared: Option<&ColumnSpec>) -> Value {
    match declared {
        None => Value::String(String::new()),
        Some(column) if column.mode == ColumnMode::Repeated => Value::Array(Vec::new()),
        Some(column) if column.column_type == ColumnType::String => Value::String(String::new()),
        Some(_) => Value::Null,
    }
}

fn flatten_row(mut row: Row, columns: &[(String, Value)]) -> Row {
    let mut billing = match row.remove("billing") {
        Some(Value::Object(billing)) => billing,
        _ => Row::new(),
    };

    for (column, fill) in columns {
        let value = match billing.remove(column) {
            None | Some(Value::Null) => fill.clone(),
            Some(value) => value,
        };
        row.insert(column.clone(), value);
    }

    row
}
