//! Multi-page order fetch loop for `WooClient`.

use chrono::NaiveDate;

use crate::error::WooError;
use crate::types::RawOrder;

use super::WooClient;
use super::MAX_PAGES;

impl WooClient {
    /// Fetches every order created on `date`, following page numbers from 1
    /// until the store returns an empty page.
    ///
    /// **All-or-nothing semantics**: on any page failure, orders from earlier
    /// pages are discarded and the error is returned. A partial day would be
    /// appended to the warehouse as if it were complete.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_page`].
    /// Returns [`WooError::PaginationLimit`] if the number of pages exceeds
    /// [`MAX_PAGES`].
    pub async fn fetch_orders_for_date(&self, date: NaiveDate) -> Result<Vec<RawOrder>, WooError> {
        let mut all_orders: Vec<RawOrder> = Vec::new();
        let mut page = 1u32;

        loop {
            if page > MAX_PAGES {
                return Err(WooError::PaginationLimit {
                    date: date.to_string(),
                    max_pages: MAX_PAGES,
                });
            }

            let orders = self.fetch_page(date, page).await?;
            if orders.is_empty() {
                break;
            }
            all_orders.extend(orders);
            page += 1;
        }

        tracing::info!(
            %date,
            pages = page - 1,
            orders = all_orders.len(),
            "fetched orders for date"
        );
        Ok(all_orders)
    }
}
