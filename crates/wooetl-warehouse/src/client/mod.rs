//! BigQuery REST client.

mod load;

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use wooetl_core::TableConfig;

use crate::error::WarehouseError;
use crate::schema::table_schema;
use crate::types::{
    ApiErrorEnvelope, TableReference, TableResource, TableSchema, TimePartitioning,
    PARTITION_EXPIRATION_MS,
};

pub use load::{LoadSummary, WriteMode};

const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com";

/// How long to wait for a load job to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollPolicy {
    #[must_use]
    pub fn new(interval_ms: u64, max_polls: u32) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            max_polls,
        }
    }
}

/// Authenticated client for one BigQuery project.
///
/// Uses a pre-issued OAuth2 access token as a bearer credential. Requests are
/// never retried.
pub struct BigQueryClient {
    client: Client,
    base_url: String,
    project: String,
    access_token: String,
    poll: PollPolicy,
}

impl BigQueryClient {
    /// Creates a client against the public BigQuery endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        project: &str,
        access_token: &str,
        timeout_secs: u64,
        poll: PollPolicy,
    ) -> Result<Self, WarehouseError> {
        Self::with_base_url(DEFAULT_BASE_URL, project, access_token, timeout_secs, poll)
    }

    /// Creates a client against `base_url` (tests point this at a mock).
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn with_base_url(
        base_url: &str,
        project: &str,
        access_token: &str,
        timeout_secs: u64,
        poll: PollPolicy,
    ) -> Result<Self, WarehouseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            project: project.to_owned(),
            access_token: access_token.to_owned(),
            poll,
        })
    }

    /// Creates the destination table with its schema, daily partitioning on
    /// the partition field and a 90-day partition expiration.
    ///
    /// # Errors
    ///
    /// - [`WarehouseError::TableExists`] on HTTP 409.
    /// - [`WarehouseError::Unauthorized`] on HTTP 401 or 403.
    /// - [`WarehouseError::Api`] on any other non-2xx status.
    /// - [`WarehouseError::Http`] on network failure.
    pub async fn create_table(&self, table: &TableConfig) -> Result<(), WarehouseError> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables",
            self.base_url, self.project, table.dataset
        );
        let body = TableResource {
            table_reference: self.table_reference(table),
            schema: TableSchema {
                fields: table_schema(&table.columns),
            },
            time_partitioning: table
                .partition_field
                .as_deref()
                .map(|field| TimePartitioning::daily(field, Some(PARTITION_EXPIRATION_MS))),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(WarehouseError::TableExists {
                table: self.qualified_name(table),
            });
        }
        check_status(response, "table create").await?;

        tracing::info!(table = %self.qualified_name(table), "created table");
        Ok(())
    }

    fn table_reference(&self, table: &TableConfig) -> TableReference {
        TableReference {
            project_id: self.project.clone(),
            dataset_id: table.dataset.clone(),
            table_id: table.table.clone(),
        }
    }

    /// `project.dataset.table` for the destination of `table`.
    #[must_use]
    pub fn qualified_name(&self, table: &TableConfig) -> String {
        format!("{}.{}.{}", self.project, table.dataset, table.table)
    }
}

/// Passes 2xx responses through; maps everything else to an error carrying
/// the API's own message when it sent one.
async fn check_status(response: Response, context: &str) -> Result<Response, WarehouseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(WarehouseError::Unauthorized {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.chars().take(300).collect());

    Err(WarehouseError::Api {
        status: status.as_u16(),
        context: context.to_owned(),
        message,
    })
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
