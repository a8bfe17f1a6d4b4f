use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid values.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("WOO_STORE_URL", "https://shop.example.com");
    m.insert("WOO_CONSUMER_KEY", "ck_test");
    m.insert("WOO_CONSUMER_SECRET", "cs_test");
    m.insert("BQ_PROJECT", "analytics-prod");
    m.insert("BQ_ACCESS_TOKEN", "ya29.token");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
    assert_eq!(parse_environment(" PROD "), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_store_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "WOO_STORE_URL"),
        "expected MissingEnvVar(WOO_STORE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_secret_as_missing() {
    let mut map = full_env();
    map.insert("WOO_CONSUMER_SECRET", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "WOO_CONSUMER_SECRET"),
        "expected MissingEnvVar(WOO_CONSUMER_SECRET), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_bq_access_token() {
    let mut map = full_env();
    map.remove("BQ_ACCESS_TOKEN");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "BQ_ACCESS_TOKEN"),
        "expected MissingEnvVar(BQ_ACCESS_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.table_config_path,
        std::path::PathBuf::from("./config/orders_table.yaml")
    );
    assert_eq!(cfg.woo_store_url, "https://shop.example.com");
    assert_eq!(cfg.woo_request_timeout_secs, 30);
    assert_eq!(cfg.woo_user_agent, "wooetl/0.1 (order-sync)");
    assert_eq!(cfg.woo_page_size, 100);
    assert_eq!(cfg.bq_project, "analytics-prod");
    assert_eq!(cfg.bq_poll_interval_ms, 1000);
    assert_eq!(cfg.bq_max_polls, 300);
}

#[test]
fn request_timeout_override() {
    let mut map = full_env();
    map.insert("WOOETL_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.woo_request_timeout_secs, 60);
}

#[test]
fn request_timeout_invalid() {
    let mut map = full_env();
    map.insert("WOOETL_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOETL_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(WOOETL_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn page_size_override() {
    let mut map = full_env();
    map.insert("WOOETL_PAGE_SIZE", "25");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.woo_page_size, 25);
}

#[test]
fn page_size_above_woocommerce_cap_is_rejected() {
    let mut map = full_env();
    map.insert("WOOETL_PAGE_SIZE", "250");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, ref reason }) if var == "WOOETL_PAGE_SIZE" && reason.contains("between 1 and 100")),
        "expected InvalidEnvVar(WOOETL_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn page_size_zero_is_rejected() {
    let mut map = full_env();
    map.insert("WOOETL_PAGE_SIZE", "0");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn bq_max_polls_invalid() {
    let mut map = full_env();
    map.insert("WOOETL_BQ_MAX_POLLS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOETL_BQ_MAX_POLLS"),
        "expected InvalidEnvVar(WOOETL_BQ_MAX_POLLS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_secrets() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("cs_test"));
    assert!(!rendered.contains("ck_test"));
    assert!(!rendered.contains("ya29.token"));
    assert!(rendered.contains("[redacted]"));
}
