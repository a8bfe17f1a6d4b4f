//! BigQuery destination: schema rendering, table creation and load jobs.

pub mod client;
pub mod error;
pub mod schema;
pub mod types;

pub use client::{BigQueryClient, LoadSummary, PollPolicy, WriteMode};
pub use error::WarehouseError;
pub use schema::{table_schema, TableFieldSchema};
