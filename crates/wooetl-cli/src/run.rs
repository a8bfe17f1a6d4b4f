//! The daily batch: fetch one day, transform, append.

use anyhow::Context;
use chrono::{DateTime, Days, NaiveDate, Utc};

use wooetl_core::TableConfig;
use wooetl_transform::{transform_orders, CoercionFailure, CountryPhoneLookup};
use wooetl_warehouse::{BigQueryClient, WriteMode};
use wooetl_woo::WooClient;

/// Failures beyond this many are counted but not logged individually.
const MAX_LOGGED_FAILURES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    /// The store had no orders for the day; nothing was loaded.
    Empty,
    Loaded { rows: u64, job_id: String },
}

/// Result of a dry run over one day.
#[derive(Debug)]
pub(crate) struct ValidationReport {
    pub orders: usize,
    pub failures: Vec<CoercionFailure>,
}

/// Runs the batch for `date`, loading with `mode`.
///
/// Every order for the day is fetched before anything is transformed, and
/// rows are only loaded once the whole batch has coerced cleanly, so a
/// failed run never leaves a partial day in the table.
///
/// # Errors
///
/// Returns an error if any page fails to fetch, any value fails coercion, or
/// the load job fails.
pub(crate) async fn run_daily<L>(
    woo: &WooClient,
    warehouse: &BigQueryClient,
    table: &TableConfig,
    lookup: &L,
    date: NaiveDate,
    mode: WriteMode,
) -> anyhow::Result<RunOutcome>
where
    L: CountryPhoneLookup + ?Sized,
{
    let orders = woo
        .fetch_orders_for_date(date)
        .await
        .with_context(|| format!("failed to fetch orders for {date}"))?;

    if orders.is_empty() {
        tracing::info!(%date, "no orders for date; skipping load");
        return Ok(RunOutcome::Empty);
    }

    let outcome = transform_orders(orders, table, lookup);
    log_failures(&outcome.failures);
    let rows = outcome
        .into_rows()
        .with_context(|| format!("orders for {date} failed type coercion"))?;

    let summary = warehouse
        .load_rows(table, &rows, mode)
        .await
        .with_context(|| format!("failed to load {} rows for {date}", rows.len()))?;

    tracing::info!(%date, rows = summary.output_rows, job_id = %summary.job_id, "daily run complete");
    Ok(RunOutcome::Loaded {
        rows: summary.output_rows,
        job_id: summary.job_id,
    })
}

/// Fetches and transforms `date` without touching the warehouse.
///
/// # Errors
///
/// Returns an error if any page fails to fetch.
pub(crate) async fn validate_day<L>(
    woo: &WooClient,
    table: &TableConfig,
    lookup: &L,
    date: NaiveDate,
) -> anyhow::Result<ValidationReport>
where
    L: CountryPhoneLookup + ?Sized,
{
    let orders = woo
        .fetch_orders_for_date(date)
        .await
        .with_context(|| format!("failed to fetch orders for {date}"))?;
    let count = orders.len();

    let outcome = transform_orders(orders, table, lookup);
    Ok(ValidationReport {
        orders: count,
        failures: outcome.failures,
    })
}

fn log_failures(failures: &[CoercionFailure]) {
    for failure in failures.iter().take(MAX_LOGGED_FAILURES) {
        tracing::error!(
            row = failure.row,
            column = %failure.column,
            reason = %failure.reason,
            "coercion failure"
        );
    }
    if failures.len() > MAX_LOGGED_FAILURES {
        tracing::error!(
            omitted = failures.len() - MAX_LOGGED_FAILURES,
            "further coercion failures not logged"
        );
    }
}

/// The calendar day before `now`, in UTC.
pub(crate) fn previous_day(now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

pub(crate) fn yesterday_utc() -> NaiveDate {
    previous_day(Utc::now())
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
