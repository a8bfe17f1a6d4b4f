use thiserror::Error;

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to encode {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("BigQuery rejected the access token (HTTP {status}); check BQ_ACCESS_TOKEN")]
    Unauthorized { status: u16 },

    #[error("BigQuery API error (HTTP {status}) during {context}: {message}")]
    Api {
        status: u16,
        context: String,
        message: String,
    },

    #[error("table {table} already exists")]
    TableExists { table: String },

    #[error("load job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("load job {job_id} not done after {polls} polls")]
    JobTimeout { job_id: String, polls: u32 },
}
