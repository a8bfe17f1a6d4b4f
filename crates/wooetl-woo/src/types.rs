//! Upstream payload types.
//!
//! The `wc/v3/orders` endpoint returns a JSON array of order objects whose
//! nested shapes (`meta_data` values, `line_items[].image`, `refunds`) vary
//! between plugins and store versions. Orders are therefore kept as untyped
//! JSON objects rather than deserialized into structs; a page element that is
//! not a JSON object fails deserialization of the whole page.

/// A single order exactly as the storefront returned it.
pub type RawOrder = serde_json::Map<String, serde_json::Value>;
