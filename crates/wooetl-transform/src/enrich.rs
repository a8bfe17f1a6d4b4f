//! Country and phone enrichment.
//!
//! Adds three columns derived from the flattened billing `country` and
//! `phone`: the ISO alpha-2 code, the country's display name, and the phone
//! number in E.164 form. Lookups sit behind [`CountryPhoneLookup`] so the
//! pipeline can run against a fixed table in tests.

use serde_json::Value;

use crate::Row;

pub const COUNTRY_ALPHA2_COLUMN: &str = "country_2symbols";
pub const COUNTRY_NAME_COLUMN: &str = "country_readable";
pub const PHONE_E164_COLUMN: &str = "international_phone";

/// Reference data for country and phone normalization.
///
/// Every method returns `""` when it cannot produce a value; enrichment
/// never fails.
pub trait CountryPhoneLookup {
    /// Maps a free-form country (code or name) to an ISO 3166-1 alpha-2 code.
    fn normalize_country(&self, raw: &str) -> String;

    /// Display name for an alpha-2 code.
    fn country_name(&self, alpha2: &str) -> String;

    /// Formats `phone` as E.164, interpreting national numbers in `alpha2`.
    fn normalize_phone(&self, phone: &str, alpha2: &str) -> String;
}

/// Adds `country_2symbols`, `country_readable` and `international_phone` to
/// every row.
///
/// Reads the top-level `country` and `phone` columns produced by billing
/// flattening. The phone is only normalized when both the phone and a
/// resolvable country are present.
#[must_use]
pub fn enrich_batch<L>(batch: Vec<Row>, lookup: &L) -> Vec<Row>
where
    L: CountryPhoneLookup + ?Sized,
{
    batch.into_iter().map(|row| enrich_row(row, lookup)).collect()
}

fn enrich_row<L>(mut row: Row, lookup: &L) -> Row
where
    L: CountryPhoneLookup + ?Sized,
{
    let country = text_field(&row, "country");
    let phone = text_field(&row, "phone");

    let alpha2 = if country.is_empty() {
        String::new()
    } else {
        lookup.normalize_country(&country)
    };
    let name = if alpha2.is_empty() {
        String::new()
    } else {
        lookup.country_name(&alpha2)
    };
    let international = if alpha2.is_empty() || phone.is_empty() {
        String::new()
    } else {
        lookup.normalize_phone(&phone, &alpha2)
    };

    row.insert(COUNTRY_ALPHA2_COLUMN.to_owned(), Value::String(alpha2));
    row.insert(COUNTRY_NAME_COLUMN.to_owned(), Value::String(name));
    row.insert(PHONE_E164_COLUMN.to_owned(), Value::String(international));
    row
}

fn text_field(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
