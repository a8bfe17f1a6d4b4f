//! Renders column specs as BigQuery `TableFieldSchema` JSON.

use serde::{Deserialize, Serialize};
use wooetl_core::{ColumnMode, ColumnSpec, ColumnType};

/// One field of a BigQuery table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub mode: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TableFieldSchema>,
}

impl From<&ColumnSpec> for TableFieldSchema {
    fn from(spec: &ColumnSpec) -> Self {
        Self {
            name: spec.name.clone(),
            field_type: bigquery_type(spec.column_type).to_owned(),
            mode: bigquery_mode(spec.mode).to_owned(),
            fields: table_schema(&spec.fields),
        }
    }
}

/// Schema fields for `columns`, in declaration order.
#[must_use]
pub fn table_schema(columns: &[ColumnSpec]) -> Vec<TableFieldSchema> {
    columns.iter().map(TableFieldSchema::from).collect()
}

#[must_use]
pub fn bigquery_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer => "INTEGER",
        ColumnType::Float => "FLOAT",
        ColumnType::Boolean => "BOOLEAN",
        ColumnType::String => "STRING",
        ColumnType::DateTime => "DATETIME",
        ColumnType::Record => "RECORD",
    }
}

#[must_use]
pub fn bigquery_mode(mode: ColumnMode) -> &'static str {
    match mode {
        ColumnMode::Nullable => "NULLABLE",
        ColumnMode::Required => "REQUIRED",
        ColumnMode::Repeated => "REPEATED",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalar_columns_render_type_and_mode() {
        let fields = table_schema(&[
            ColumnSpec::new("id", ColumnType::Integer).required(),
            ColumnSpec::new("total", ColumnType::Float),
            ColumnSpec::new("date_created", ColumnType::DateTime),
        ]);
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!([
                { "name": "id", "type": "INTEGER", "mode": "REQUIRED" },
                { "name": "total", "type": "FLOAT", "mode": "NULLABLE" },
                { "name": "date_created", "type": "DATETIME", "mode": "NULLABLE" }
            ])
        );
    }

    #[test]
    fn nested_records_render_sub_fields() {
        let fields = table_schema(&[ColumnSpec::repeated_record(
            "line_items",
            vec![
                ColumnSpec::new("quantity", ColumnType::Integer),
                ColumnSpec::record(
                    "image",
                    vec![ColumnSpec::new("src", ColumnType::String)],
                ),
            ],
        )]);
        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!([{
                "name": "line_items",
                "type": "RECORD",
                "mode": "REPEATED",
                "fields": [
                    { "name": "quantity", "type": "INTEGER", "mode": "NULLABLE" },
                    {
                        "name": "image",
                        "type": "RECORD",
                        "mode": "NULLABLE",
                        "fields": [{ "name": "src", "type": "STRING", "mode": "NULLABLE" }]
                    }
                ]
            }])
        );
    }

    #[test]
    fn every_type_has_a_bigquery_name() {
        assert_eq!(bigquery_type(ColumnType::Boolean), "BOOLEAN");
        assert_eq!(bigquery_type(ColumnType::String), "STRING");
        assert_eq!(bigquery_type(ColumnType::Record), "RECORD");
    }
}
