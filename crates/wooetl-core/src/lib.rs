//! Shared configuration types for the `wooetl` workspace.
//!
//! Two sources of configuration exist: process environment variables
//! (credentials, timeouts, paths) parsed into [`AppConfig`], and the YAML
//! table definition parsed into [`TableConfig`], which names the destination
//! table, its columns and the nested-field sanitize policies.

pub mod app_config;
pub mod config;
pub mod table;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use table::{
    load_table_config, parse_table_config, ColumnMode, ColumnSpec, ColumnType, NestedPolicy, SanitizeConfig,
    TableConfig,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read table config {path}: {source}")]
    TableFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse table config: {0}")]
    TableFileParse(#[from] serde_yaml::Error),

    #[error("unknown column type '{0}'")]
    UnknownColumnType(String),

    #[error("table config validation failed: {0}")]
    Validation(String),
}
