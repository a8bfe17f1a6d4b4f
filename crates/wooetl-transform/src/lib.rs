//! Order normalization pipeline.
//!
//! Turns raw WooCommerce order objects into flat rows that match the
//! destination table exactly. Stages run in a fixed order, each taking a
//! batch and returning a new one:
//!
//! 1. [`flatten`] lifts `billing.*` to top-level columns.
//! 2. [`extract`] derives `promocode` and `affiliate_id`.
//! 3. [`sanitize`] forces `meta_data`, `line_items` and `refunds` into their
//!    fixed record shapes.
//! 4. [`enrich`] adds country and phone columns.
//! 5. [`coerce`] casts every column to its declared type and reports
//!    failures per row and column.

pub mod coerce;
pub mod country;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod pipeline;
pub mod sanitize;

pub use coerce::{coerce_batch, CoercionFailure, CoercionOutcome};
pub use country::IsoLookup;
pub use enrich::{enrich_batch, CountryPhoneLookup};
pub use error::TransformError;
pub use extract::{extract_affiliate_id, extract_promocode, ExtractionRule};
pub use flatten::flatten_billing;
pub use pipeline::{prepare_orders, transform_orders};
pub use sanitize::{sanitize_batch, sanitize_order, sanitize_repeated_field};

/// One order (or one output row) as a JSON object.
pub type Row = serde_json::Map<String, serde_json::Value>;
