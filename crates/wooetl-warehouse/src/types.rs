//! Request and response bodies for the BigQuery v2 REST API.
//!
//! Only the fields this crate reads or writes are modelled. Response structs
//! default every field so partial payloads still deserialize.

use serde::{Deserialize, Serialize};

use crate::schema::TableFieldSchema;

/// 90 days, in milliseconds.
pub const PARTITION_EXPIRATION_MS: u64 = 90 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePartitioning {
    #[serde(rename = "type")]
    pub partition_type: String,
    pub field: String,
    /// int64 fields travel as JSON strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_ms: Option<String>,
}

impl TimePartitioning {
    #[must_use]
    pub fn daily(field: &str, expiration_ms: Option<u64>) -> Self {
        Self {
            partition_type: "DAY".to_owned(),
            field: field.to_owned(),
            expiration_ms: expiration_ms.map(|ms| ms.to_string()),
        }
    }
}

/// Body of `tables.insert`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResource {
    pub table_reference: TableReference,
    pub schema: TableSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_partitioning: Option<TimePartitioning>,
}

/// Body of the metadata part of `jobs.insert`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadJobRequest {
    pub job_reference: JobReference,
    pub configuration: JobConfiguration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobConfiguration {
    pub load: LoadConfiguration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadConfiguration {
    pub destination_table: TableReference,
    pub schema: TableSchema,
    pub source_format: String,
    pub write_disposition: String,
    pub create_disposition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_partitioning: Option<TimePartitioning>,
}

/// The parts of a `Job` resource read back while polling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobResponse {
    pub job_reference: JobReference,
    pub status: JobStatus,
    pub statistics: JobStatistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatus {
    pub state: String,
    pub error_result: Option<ErrorProto>,
    pub errors: Vec<ErrorProto>,
}

impl JobStatus {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == "DONE"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorProto {
    pub reason: String,
    pub location: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobStatistics {
    pub load: Option<LoadStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadStatistics {
    pub output_rows: Option<String>,
}

/// Error envelope returned by Google APIs on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
}
