//! Stage composition.

use wooetl_core::TableConfig;

use crate::coerce::{coerce_batch, CoercionOutcome};
use crate::enrich::{enrich_batch, CountryPhoneLookup};
use crate::extract::add_derived_fields;
use crate::flatten::flatten_billing;
use crate::sanitize::sanitize_batch;
use crate::Row;

/// Runs every stage before coercion: flatten, derive, sanitize, enrich.
#[must_use]
pub fn prepare_orders<L>(orders: Vec<Row>, table: &TableConfig, lookup: &L) -> Vec<Row>
where
    L: CountryPhoneLookup + ?Sized,
{
    let flattened = flatten_billing(orders, &table.columns);
    let derived = add_derived_fields(flattened);
    let sanitized = sanitize_batch(derived, &table.sanitize);
    enrich_batch(sanitized, lookup)
}

/// Runs the full pipeline against `table` and returns coerced rows plus any
/// coercion failures.
#[must_use]
pub fn transform_orders<L>(orders: Vec<Row>, table: &TableConfig, lookup: &L) -> CoercionOutcome
where
    L: CountryPhoneLookup + ?Sized,
{
    let count = orders.len();
    let prepared = prepare_orders(orders, table, lookup);
    let outcome = coerce_batch(&prepared, &table.columns);

    tracing::debug!(
        orders = count,
        columns = table.columns.len(),
        failures = outcome.failures.len(),
        "transformed order batch"
    );
    outcome
}
