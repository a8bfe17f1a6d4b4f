use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub table_config_path: PathBuf,
    pub woo_store_url: String,
    pub woo_consumer_key: String,
    pub woo_consumer_secret: String,
    pub woo_request_timeout_secs: u64,
    pub woo_user_agent: String,
    pub woo_page_size: u32,
    pub bq_project: String,
    pub bq_access_token: String,
    pub bq_poll_interval_ms: u64,
    pub bq_max_polls: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("table_config_path", &self.table_config_path)
            .field("woo_store_url", &self.woo_store_url)
            .field("woo_consumer_key", &"[redacted]")
            .field("woo_consumer_secret", &"[redacted]")
            .field("woo_request_timeout_secs", &self.woo_request_timeout_secs)
            .field("woo_user_agent", &self.woo_user_agent)
            .field("woo_page_size", &self.woo_page_size)
            .field("bq_project", &self.bq_project)
            .field("bq_access_token", &"[redacted]")
            .field("bq_poll_interval_ms", &self.bq_poll_interval_ms)
            .field("bq_max_polls", &self.bq_max_polls)
            .finish()
    }
}
