//! Derived-field extraction.
//!
//! `promocode` and `affiliate_id` are not first-class order fields; they live
//! in `coupon_lines` or in `meta_data` entries written by coupon and
//! affiliate plugins. Each is described as an ordered list of
//! [`ExtractionRule`]s and the first rule that yields a value wins.

use serde_json::Value;

use crate::Row;

/// Where to look for one derived value inside an order.
///
/// Scans the elements of `array` in order. When `keys` is non-empty only
/// elements whose `key` field is one of `keys` are considered. The first
/// considered element whose `value_field` holds a non-empty scalar produces
/// the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    pub array: &'static str,
    pub keys: &'static [&'static str],
    pub value_field: &'static str,
}

impl ExtractionRule {
    /// Takes `value_field` from any element of `array`.
    #[must_use]
    pub const fn field(array: &'static str, value_field: &'static str) -> Self {
        Self {
            array,
            keys: &[],
            value_field,
        }
    }

    /// Takes `value` from `array` elements whose `key` is in `keys`.
    #[must_use]
    pub const fn keyed(array: &'static str, keys: &'static [&'static str]) -> Self {
        Self {
            array,
            keys,
            value_field: "value",
        }
    }

    /// Applies the rule to one order.
    #[must_use]
    pub fn find(&self, order: &Row) -> Option<String> {
        let Some(Value::Array(elements)) = order.get(self.array) else {
            return None;
        };

        elements
            .iter()
            .filter_map(Value::as_object)
            .filter(|element| self.matches_key(element))
            .find_map(|element| element.get(self.value_field).and_then(scalar_text))
    }

    fn matches_key(&self, element: &Row) -> bool {
        if self.keys.is_empty() {
            return true;
        }
        element
            .get("key")
            .and_then(Value::as_str)
            .is_some_and(|key| self.keys.contains(&key))
    }
}

/// Coupon line codes first, then coupon-plugin meta entries.
pub const PROMOCODE_RULES: &[ExtractionRule] = &[
    ExtractionRule::field("coupon_lines", "code"),
    ExtractionRule::keyed("meta_data", &["AffiliateCouponCode", "CouponCode"]),
];

/// Affiliate plugin's partner id.
pub const AFFILIATE_ID_RULES: &[ExtractionRule] = &[ExtractionRule::keyed("meta_data", &["if_pid"])];

/// Runs `rules` in priority order and returns the first hit.
#[must_use]
pub fn first_match(order: &Row, rules: &[ExtractionRule]) -> Option<String> {
    rules.iter().find_map(|rule| rule.find(order))
}

/// Upper-cased coupon code applied to the order, or `""`.
#[must_use]
pub fn extract_promocode(order: &Row) -> String {
    first_match(order, PROMOCODE_RULES)
        .map(|code| code.to_uppercase())
        .unwrap_or_default()
}

/// Affiliate id recorded on the order, or `""`.
#[must_use]
pub fn extract_affiliate_id(order: &Row) -> String {
    first_match(order, AFFILIATE_ID_RULES).unwrap_or_default()
}

/// Adds `promocode` and `affiliate_id` to every order in the batch.
#[must_use]
pub fn add_derived_fields(batch: Vec<Row>) -> Vec<Row> {
    batch
        .into_iter()
        .map(|mut order| {
            let promocode = extract_promocode(&order);
            let affiliate_id = extract_affiliate_id(&order);
            order.insert("promocode".to_owned(), Value::String(promocode));
            order.insert("affiliate_id".to_owned(), Value::String(affiliate_id));
            order
        })
        .collect()
}

/// Non-empty scalar as text, returned unchanged. Strings that are blank
/// after trimming, `null`, booleans and structured values yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => (!s.trim().is_empty()).then(|| s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
