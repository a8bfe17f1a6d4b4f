//! Destination table definition loaded from YAML.
//!
//! The table file declares where rows land (`dataset`, `table`, optional
//! `partition_field`), how nested fields are sanitized, and the full column
//! list with declared types. Column types accept both canonical names
//! (`integer`, `float`, `boolean`, `string`, `datetime`, `record`) and the
//! dtype-style aliases older table files used (`int64`, `float64`, `str`,
//! `datetime64[ns]`, ...).

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Declared semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
    DateTime,
    Record,
}

impl ColumnType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::String => "string",
            ColumnType::DateTime => "datetime",
            ColumnType::Record => "record",
        }
    }

    #[must_use]
    pub fn is_record(self) -> bool {
        matches!(self, ColumnType::Record)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let column_type = match normalized.as_str() {
            "integer" | "int" | "int8" | "int16" | "int32" | "int64" => ColumnType::Integer,
            "float" | "float16" | "float32" | "float64" | "double" => ColumnType::Float,
            "boolean" | "bool" => ColumnType::Boolean,
            "string" | "str" => ColumnType::String,
            "datetime" | "timestamp" => ColumnType::DateTime,
            "record" | "struct" => ColumnType::Record,
            other if other.starts_with("datetime64") => ColumnType::DateTime,
            _ => return Err(ConfigError::UnknownColumnType(s.to_string())),
        };
        Ok(column_type)
    }
}

impl TryFrom<String> for ColumnType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

/// Column cardinality, mirroring the warehouse field modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

impl ColumnMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnMode::Nullable => "nullable",
            ColumnMode::Required => "required",
            ColumnMode::Repeated => "repeated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub mode: ColumnMode,
    /// Sub-fields; only meaningful for `record` columns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ColumnSpec>,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            mode: ColumnMode::Nullable,
            fields: Vec::new(),
        }
    }

    /// A repeated record column with the given sub-fields.
    #[must_use]
    pub fn repeated_record(name: &str, fields: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.to_string(),
            column_type: ColumnType::Record,
            mode: ColumnMode::Repeated,
            fields,
        }
    }

    /// A single (non-repeated) record column with the given sub-fields.
    #[must_use]
    pub fn record(name: &str, fields: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.to_string(),
            column_type: ColumnType::Record,
            mode: ColumnMode::Nullable,
            fields,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.mode = ColumnMode::Required;
        self
    }

    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.mode = ColumnMode::Repeated;
        self
    }
}

/// How a nested repeated field is reduced to its fixed warehouse shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedPolicy {
    /// Keep elements, pruned to the allowed key set.
    #[default]
    Filter,
    /// Always emit an empty sequence.
    ForceEmpty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeConfig {
    #[serde(default)]
    pub line_item_meta_data: NestedPolicy,
    #[serde(default)]
    pub refunds: NestedPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub dataset: String,
    pub table: String,
    #[serde(default)]
    pub partition_field: Option<String>,
    #[serde(default)]
    pub sanitize: SanitizeConfig,
    pub columns: Vec<ColumnSpec>,
}

impl TableConfig {
    /// Looks up a top-level column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Load and validate a table definition from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_table_config(path: &Path) -> Result<TableConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TableFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_table_config(&content)
}

/// Parse and validate a table definition from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_table_config(content: &str) -> Result<TableConfig, ConfigError> {
    let table: TableConfig = serde_yaml::from_str(content)?;
    validate_table(&table)?;
    Ok(table)
}

fn validate_table(table: &TableConfig) -> Result<(), ConfigError> {
    validate_identifier("dataset", &table.dataset)?;
    validate_identifier("table", &table.table)?;

    if table.columns.is_empty() {
        return Err(ConfigError::Validation(
            "table must declare at least one column".to_string(),
        ));
    }
    validate_columns(&table.columns, "")?;

    if let Some(field) = &table.partition_field {
        let column = table.column(field).ok_or_else(|| {
            ConfigError::Validation(format!(
                "partition field '{field}' is not a declared column"
            ))
        })?;
        if column.column_type != ColumnType::DateTime || column.mode == ColumnMode::Repeated {
            return Err(ConfigError::Validation(format!(
                "partition field '{field}' must be a non-repeated datetime column, found {} ({})",
                column.column_type,
                column.mode.as_str()
            )));
        }
    }

    Ok(())
}

fn validate_identifier(what: &str, value: &str) -> Result<(), ConfigError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{what} name '{value}' must be non-empty and contain only letters, digits, or '_'"
        )))
    }
}

fn validate_columns(columns: &[ColumnSpec], parent: &str) -> Result<(), ConfigError> {
    // Warehouse column names are case-insensitive.
    let mut seen = HashSet::new();

    for column in columns {
        let path = if parent.is_empty() {
            column.name.clone()
        } else {
            format!("{parent}.{}", column.name)
        };

        if column.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "column names must be non-empty (under '{parent}')"
            )));
        }
        if !seen.insert(column.name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate column name: '{path}'"
            )));
        }

        match (column.column_type.is_record(), column.fields.is_empty()) {
            (true, true) => {
                return Err(ConfigError::Validation(format!(
                    "record column '{path}' must declare at least one field"
                )));
            }
            (false, false) => {
                return Err(ConfigError::Validation(format!(
                    "scalar column '{path}' of type {} cannot declare fields",
                    column.column_type
                )));
            }
            (true, false) => validate_columns(&column.fields, &path)?,
            (false, true) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
