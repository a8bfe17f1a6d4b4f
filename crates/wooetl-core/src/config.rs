use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// WooCommerce caps `per_page` at 100.
const MAX_PAGE_SIZE: u32 = 100;

/// Reads `.env` (if present) and then builds [`AppConfig`] from the process
/// environment.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when a credential is unset or blank
/// and [`ConfigError::InvalidEnvVar`] when a numeric setting does not parse
/// or is out of range.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Builds [`AppConfig`] from the process environment only; `.env` is not read.
///
/// # Errors
///
/// Same as [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parses the numeric variable `var`, falling back to `default` when unset.
fn parse_number<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };
    let or_default = |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_string());

    let woo_store_url = require("WOO_STORE_URL")?;
    let woo_consumer_key = require("WOO_CONSUMER_KEY")?;
    let woo_consumer_secret = require("WOO_CONSUMER_SECRET")?;
    let bq_project = require("BQ_PROJECT")?;
    let bq_access_token = require("BQ_ACCESS_TOKEN")?;

    let env = parse_environment(&or_default("WOOETL_ENV", "development"));
    let log_level = or_default("WOOETL_LOG_LEVEL", "info");
    let table_config_path = PathBuf::from(or_default(
        "WOOETL_TABLE_CONFIG_PATH",
        "./config/orders_table.yaml",
    ));

    let woo_request_timeout_secs = parse_number(&lookup, "WOOETL_REQUEST_TIMEOUT_SECS", 30_u64)?;
    let woo_user_agent = or_default("WOOETL_USER_AGENT", "wooetl/0.1 (order-sync)");

    let woo_page_size = parse_number(&lookup, "WOOETL_PAGE_SIZE", MAX_PAGE_SIZE)?;
    if woo_page_size == 0 || woo_page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidEnvVar {
            var: "WOOETL_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {woo_page_size}"),
        });
    }

    let bq_poll_interval_ms = parse_number(&lookup, "WOOETL_BQ_POLL_INTERVAL_MS", 1_000_u64)?;
    let bq_max_polls = parse_number(&lookup, "WOOETL_BQ_MAX_POLLS", 300_u32)?;

    Ok(AppConfig {
        env,
        log_level,
        table_config_path,
        woo_store_url,
        woo_consumer_key,
        woo_consumer_secret,
        woo_request_timeout_secs,
        woo_user_agent,
        woo_page_size,
        bq_project,
        bq_access_token,
        bq_poll_interval_ms,
        bq_max_polls,
    })
}

/// Anything other than `production` or `test` is development.
fn parse_environment(raw: &str) -> Environment {
    match raw.trim().to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
