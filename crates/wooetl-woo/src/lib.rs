//! WooCommerce REST client used as the upstream order source.
//!
//! Orders are returned as raw JSON objects; reshaping them is the job of
//! `wooetl-transform`.

pub mod client;
pub mod error;
pub mod types;

pub use client::WooClient;
pub use error::WooError;
pub use types::RawOrder;
