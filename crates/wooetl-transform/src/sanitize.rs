//! Nested-field sanitization.
//!
//! WooCommerce plugins write arbitrary shapes into `meta_data`, line items
//! and refunds. The warehouse schema declares fixed record shapes for these
//! columns, so every element is projected onto an allow-list of keys before
//! coercion. Sanitizing an already-sanitized order is a no-op.

use serde_json::Value;
use wooetl_core::{NestedPolicy, SanitizeConfig};

use crate::Row;

/// Keys kept on each `meta_data` entry (order-level and line-item level).
pub const META_FIELDS: [&str; 3] = ["id", "key", "value"];

/// Keys kept on each line item.
pub const LINE_ITEM_FIELDS: [&str; 14] = [
    "name",
    "product_id",
    "variation_id",
    "quantity",
    "subtotal",
    "subtotal_tax",
    "total",
    "total_tax",
    "sku",
    "price",
    "parent_name",
    "meta_data",
    "taxes",
    "image",
];

/// Keys kept on a line item's `image`.
pub const IMAGE_FIELDS: [&str; 2] = ["id", "src"];

/// Keys kept on each refund.
pub const REFUND_FIELDS: [&str; 3] = ["id", "reason", "total"];

/// Counts elements discarded because they were not records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShapeReport {
    pub dropped_elements: usize,
}

/// Normalizes a candidate repeated field to a list of records.
///
/// Anything that is not an array yields an empty list; array elements that
/// are not objects are dropped.
#[must_use]
pub fn sanitize_repeated_field(value: Value) -> Vec<Row> {
    collect_records(value, &mut ShapeReport::default())
}

/// Sanitizes a `meta_data` array: `{id, key, value}` per entry, structured
/// values serialized to JSON text.
#[must_use]
pub fn sanitize_meta_data(value: Value) -> Vec<Value> {
    meta_entries(value, &mut ShapeReport::default())
}

/// Sanitizes a `line_items` array under the given line-item `meta_data`
/// policy.
#[must_use]
pub fn sanitize_line_items(value: Value, meta_policy: NestedPolicy) -> Vec<Value> {
    line_items(value, meta_policy, &mut ShapeReport::default())
}

/// Sanitizes a `refunds` array under the given policy.
#[must_use]
pub fn sanitize_refunds(value: Value, policy: NestedPolicy) -> Vec<Value> {
    refunds(value, policy, &mut ShapeReport::default())
}

/// Sanitizes the nested fields of one order.
///
/// `meta_data`, `line_items` and `refunds` are always present afterwards,
/// as arrays. Other keys are left untouched.
#[must_use]
pub fn sanitize_order(order: Row, config: &SanitizeConfig) -> Row {
    sanitize_with_report(order, config, &mut ShapeReport::default())
}

/// Sanitizes every order in the batch, logging how many malformed nested
/// elements were dropped.
#[must_use]
pub fn sanitize_batch(batch: Vec<Row>, config: &SanitizeConfig) -> Vec<Row> {
    let mut report = ShapeReport::default();
    let sanitized: Vec<Row> = batch
        .into_iter()
        .map(|order| sanitize_with_report(order, config, &mut report))
        .collect();

    if report.dropped_elements > 0 {
        tracing::warn!(
            dropped = report.dropped_elements,
            "dropped non-record elements from nested order fields"
        );
    }
    sanitized
}

fn sanitize_with_report(mut order: Row, config: &SanitizeConfig, report: &mut ShapeReport) -> Row {
    let meta = order.remove("meta_data").unwrap_or(Value::Null);
    order.insert("meta_data".to_owned(), Value::Array(meta_entries(meta, report)));

    let items = order.remove("line_items").unwrap_or(Value::Null);
    order.insert(
        "line_items".to_owned(),
        Value::Array(line_items(items, config.line_item_meta_data, report)),
    );

    let refund_list = order.remove("refunds").unwrap_or(Value::Null);
    order.insert(
        "refunds".to_owned(),
        Value::Array(refunds(refund_list, config.refunds, report)),
    );

    order
}

fn collect_records(value: Value, report: &mut ShapeReport) -> Vec<Row> {
    let Value::Array(elements) = value else {
        return Vec::new();
    };

    let total = elements.len();
    let records: Vec<Row> = elements
        .into_iter()
        .filter_map(|element| match element {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    report.dropped_elements += total - records.len();
    records
}

/// Keeps exactly `fields`, in that order, filling absent keys with `null`.
fn project(mut record: Row, fields: &[&str]) -> Row {
    fields
        .iter()
        .map(|field| ((*field).to_owned(), record.remove(*field).unwrap_or(Value::Null)))
        .collect()
}

fn stringify_structured(value: Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
        scalar => scalar,
    }
}

fn meta_entries(value: Value, report: &mut ShapeReport) -> Vec<Value> {
    collect_records(value, report)
        .into_iter()
        .map(|entry| {
            let mut entry = project(entry, &META_FIELDS);
            if let Some(v) = entry.get_mut("value") {
                *v = stringify_structured(v.take());
            }
            Value::Object(entry)
        })
        .collect()
}

fn line_items(value: Value, meta_policy: NestedPolicy, report: &mut ShapeReport) -> Vec<Value> {
    collect_records(value, report)
        .into_iter()
        .map(|item| Value::Object(line_item(item, meta_policy, report)))
        .collect()
}

fn line_item(item: Row, meta_policy: NestedPolicy, report: &mut ShapeReport) -> Row {
    let mut item = project(item, &LINE_ITEM_FIELDS);

    let meta = item.remove("meta_data").unwrap_or(Value::Null);
    let meta = match meta_policy {
        NestedPolicy::Filter => meta_entries(meta, report),
        NestedPolicy::ForceEmpty => Vec::new(),
    };
    item.insert("meta_data".to_owned(), Value::Array(meta));

    // Tax breakdowns are not loaded; only the line totals are.
    item.insert("taxes".to_owned(), Value::Array(Vec::new()));

    let image = match item.remove("image") {
        Some(Value::Object(image)) => project(image, &IMAGE_FIELDS),
        _ => project(Row::new(), &IMAGE_FIELDS),
    };
    item.insert("image".to_owned(), Value::Object(image));

    item
}

fn refunds(value: Value, policy: NestedPolicy, report: &mut ShapeReport) -> Vec<Value> {
    match policy {
        NestedPolicy::Filter => collect_records(value, report)
            .into_iter()
            .map(|refund| Value::Object(project(refund, &REFUND_FIELDS)))
            .collect(),
        NestedPolicy::ForceEmpty => Vec::new(),
    }
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
