//! Load jobs.

use serde_json::{Map, Value};
use uuid::Uuid;
use wooetl_core::TableConfig;

use crate::error::WarehouseError;
use crate::schema::table_schema;
use crate::types::{
    JobConfiguration, JobReference, JobResponse, JobStatus, LoadConfiguration, LoadJobRequest,
    TableSchema, TimePartitioning,
};

use super::{check_status, BigQueryClient};

/// Result of a finished load job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub job_id: String,
    /// Rows BigQuery reports as written; falls back to the submitted count
    /// when the job statistics omit it.
    pub output_rows: u64,
}

/// How a load job treats rows already in the destination table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Add the rows to the table.
    #[default]
    Append,
    /// Replace the table's contents with the rows.
    Replace,
}

impl WriteMode {
    #[must_use]
    pub fn disposition(self) -> &'static str {
        match self {
            WriteMode::Append => "WRITE_APPEND",
            WriteMode::Replace => "WRITE_TRUNCATE",
        }
    }
}

impl BigQueryClient {
    /// Loads `rows` into the destination table in one load job and waits for
    /// it to finish.
    ///
    /// Rows are sent as newline-delimited JSON with the table's explicit
    /// schema, the write disposition for `mode` and daily partitioning on the
    /// partition field. The job either lands every row or none.
    ///
    /// # Errors
    ///
    /// - [`WarehouseError::Encode`] if a row cannot be serialized.
    /// - [`WarehouseError::Unauthorized`] / [`WarehouseError::Api`] on a
    ///   rejected upload or poll.
    /// - [`WarehouseError::JobFailed`] if the job finishes with an error.
    /// - [`WarehouseError::JobTimeout`] if the job is not done within the
    ///   poll budget.
    pub async fn load_rows(
        &self,
        table: &TableConfig,
        rows: &[Map<String, Value>],
        mode: WriteMode,
    ) -> Result<LoadSummary, WarehouseError> {
        let job_id = format!("wooetl_{}", Uuid::new_v4().simple());
        let request = self.load_request(table, &job_id, mode);
        let metadata = serde_json::to_string(&request).map_err(|e| WarehouseError::Encode {
            context: "load job configuration".to_owned(),
            source: e,
        })?;
        let payload = encode_ndjson(rows)?;

        let boundary = format!("wooetl-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, &payload);
        let url = format!(
            "{}/upload/bigquery/v2/projects/{}/jobs?uploadType=multipart",
            self.base_url, self.project
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;
        let response = check_status(response, "load job submit").await?;
        let submitted: JobResponse = parse_job(response, &job_id).await?;

        tracing::info!(
            %job_id,
            rows = rows.len(),
            table = %self.qualified_name(table),
            disposition = mode.disposition(),
            "submitted load job"
        );

        let location = submitted.job_reference.location.clone();
        let status = if submitted.status.is_done() {
            submitted
        } else {
            self.wait_for_job(&job_id, location.as_deref()).await?
        };
        finish(&job_id, &status.status)?;

        let output_rows = status
            .statistics
            .load
            .and_then(|load| load.output_rows)
            .and_then(|count| count.parse().ok())
            .unwrap_or(rows.len() as u64);

        tracing::info!(%job_id, output_rows, "load job finished");
        Ok(LoadSummary {
            job_id,
            output_rows,
        })
    }

    async fn wait_for_job(
        &self,
        job_id: &str,
        location: Option<&str>,
    ) -> Result<JobResponse, WarehouseError> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/jobs/{job_id}",
            self.base_url, self.project
        );

        for poll in 1..=self.poll.max_polls {
            tokio::time::sleep(self.poll.interval).await;

            let mut request = self.client.get(&url).bearer_auth(&self.access_token);
            if let Some(location) = location {
                request = request.query(&[("location", location)]);
            }
            let response = check_status(request.send().await?, "load job poll").await?;
            let job = parse_job(response, job_id).await?;

            tracing::debug!(%job_id, poll, state = %job.status.state, "polled load job");
            if job.status.is_done() {
                return Ok(job);
            }
        }

        Err(WarehouseError::JobTimeout {
            job_id: job_id.to_owned(),
            polls: self.poll.max_polls,
        })
    }

    fn load_request(&self, table: &TableConfig, job_id: &str, mode: WriteMode) -> LoadJobRequest {
        LoadJobRequest {
            job_reference: JobReference {
                project_id: self.project.clone(),
                job_id: job_id.to_owned(),
                location: None,
            },
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: self.table_reference(table),
                    schema: TableSchema {
                        fields: table_schema(&table.columns),
                    },
                    source_format: "NEWLINE_DELIMITED_JSON".to_owned(),
                    write_disposition: mode.disposition().to_owned(),
                    create_disposition: "CREATE_IF_NEEDED".to_owned(),
                    time_partitioning: table
                        .partition_field
                        .as_deref()
                        .map(|field| TimePartitioning::daily(field, None)),
                },
            },
        }
    }
}

async fn parse_job(response: reqwest::Response, job_id: &str) -> Result<JobResponse, WarehouseError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| WarehouseError::Deserialize {
        context: format!("load job {job_id}"),
        source: e,
    })
}

fn finish(job_id: &str, status: &JobStatus) -> Result<(), WarehouseError> {
    let Some(error) = &status.error_result else {
        return Ok(());
    };

    let mut message = error.message.clone();
    if let Some(first) = status.errors.iter().find(|e| e.message != error.message) {
        message.push_str("; ");
        message.push_str(&first.message);
    }
    Err(WarehouseError::JobFailed {
        job_id: job_id.to_owned(),
        message,
    })
}

/// One JSON object per line.
pub(crate) fn encode_ndjson(rows: &[Map<String, Value>]) -> Result<String, WarehouseError> {
    let mut out = String::new();
    for (index, row) in rows.iter().enumerate() {
        let line = serde_json::to_string(row).map_err(|e| WarehouseError::Encode {
            context: format!("row {index}"),
            source: e,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// `multipart/related` body: job metadata part followed by the data part.
pub(crate) fn multipart_related(boundary: &str, metadata: &str, payload: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         {payload}\r\n\
         --{boundary}--\r\n"
    )
}
