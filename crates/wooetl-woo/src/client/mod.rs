//! HTTP client for the WooCommerce `wc/v3/orders` endpoint.

mod fetch_all;

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Url};

use crate::error::WooError;
use crate::types::RawOrder;

/// Maximum number of pages to fetch for one day before returning an error.
/// Guards against a store that never returns an empty page.
pub(super) const MAX_PAGES: u32 = 500;

const ORDERS_PATH: &str = "wp-json/wc/v3/orders";

/// HTTP client for one WooCommerce store.
///
/// Authenticates with the REST API consumer key/secret pair over HTTP basic
/// auth. Requests are never retried: any transport error, auth rejection or
/// non-2xx status is returned to the caller, which aborts the run.
pub struct WooClient {
    client: Client,
    orders_url: Url,
    consumer_key: String,
    consumer_secret: String,
    page_size: u32,
}

impl WooClient {
    /// Creates a `WooClient` for the store rooted at `store_url`.
    ///
    /// `store_url` may include a path when WordPress is installed in a
    /// subdirectory (e.g. `https://example.com/shop`).
    ///
    /// # Errors
    ///
    /// Returns [`WooError::InvalidStoreUrl`] if `store_url` is not an absolute
    /// http(s) URL, or [`WooError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        store_url: &str,
        consumer_key: &str,
        consumer_secret: &str,
        timeout_secs: u64,
        user_agent: &str,
        page_size: u32,
    ) -> Result<Self, WooError> {
        let orders_url = Self::orders_endpoint(store_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            orders_url,
            consumer_key: consumer_key.to_owned(),
            consumer_secret: consumer_secret.to_owned(),
            page_size,
        })
    }

    /// Fetches one page of orders created on `date` (UTC day bounds).
    ///
    /// An empty vector signals the end of pagination.
    ///
    /// # Errors
    ///
    /// - [`WooError::Unauthorized`] — HTTP 401 or 403.
    /// - [`WooError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`WooError::Http`] — network or TLS failure.
    /// - [`WooError::Deserialize`] — body is not a JSON array of objects.
    pub async fn fetch_page(&self, date: NaiveDate, page: u32) -> Result<Vec<RawOrder>, WooError> {
        let url = self.page_url(date, page);

        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(WooError::Unauthorized {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(WooError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let orders = serde_json::from_str::<Vec<RawOrder>>(&body).map_err(|e| {
            WooError::Deserialize {
                context: format!("orders page {page} for {date}"),
                source: e,
            }
        })?;

        tracing::debug!(%date, page, orders = orders.len(), "fetched orders page");
        Ok(orders)
    }

    /// Builds the orders URL for one page of one day.
    fn page_url(&self, date: NaiveDate, page: u32) -> Url {
        let day = date.format("%Y-%m-%d");
        let mut url = self.orders_url.clone();
        url.query_pairs_mut()
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("after", &format!("{day}T00:00:00Z"))
            .append_pair("before", &format!("{day}T23:59:59Z"));
        url
    }

    /// Resolves `{store_url}/wp-json/wc/v3/orders`.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::InvalidStoreUrl`] if the URL cannot be parsed or is
    /// not http(s).
    fn orders_endpoint(store_url: &str) -> Result<Url, WooError> {
        let invalid = |reason: String| WooError::InvalidStoreUrl {
            store_url: store_url.to_owned(),
            reason,
        };

        let base = format!("{}/", store_url.trim().trim_end_matches('/'));
        let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }
        base.join(ORDERS_PATH).map_err(|e| invalid(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
