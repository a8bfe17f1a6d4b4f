use serde_json::json;

use super::*;

fn order(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

#[test]
fn promocode_from_first_coupon_line_is_uppercased() {
    let o = order(json!({
        "coupon_lines": [{ "code": "spring10" }, { "code": "other" }],
        "meta_data": [{ "key": "CouponCode", "value": "META" }]
    }));
    assert_eq!(extract_promocode(&o), "SPRING10");
}

#[test]
fn promocode_skips_blank_coupon_codes() {
    let o = order(json!({ "coupon_lines": [{ "code": "  " }, { "code": "save5" }] }));
    assert_eq!(extract_promocode(&o), "SAVE5");
}

#[test]
fn promocode_falls_back_to_meta_data() {
    let o = order(json!({
        "coupon_lines": [],
        "meta_data": [
            { "key": "_shipping_note", "value": "x" },
            { "key": "AffiliateCouponCode", "value": "aff20" }
        ]
    }));
    assert_eq!(extract_promocode(&o), "AFF20");
}

#[test]
fn promocode_meta_keys_are_searched_in_entry_order() {
    let o = order(json!({
        "meta_data": [
            { "key": "CouponCode", "value": "first" },
            { "key": "AffiliateCouponCode", "value": "second" }
        ]
    }));
    assert_eq!(extract_promocode(&o), "FIRST");
}

#[test]
fn promocode_is_empty_when_nothing_matches() {
    let o = order(json!({ "coupon_lines": null, "meta_data": [{ "key": "other", "value": "x" }] }));
    assert_eq!(extract_promocode(&o), "");
    assert_eq!(extract_promocode(&Row::new()), "");
}

#[test]
fn promocode_ignores_structured_and_null_values() {
    let o = order(json!({
        "coupon_lines": [{ "code": null }, { "code": { "nested": true } }],
        "meta_data": [{ "key": "CouponCode", "value": ["a"] }]
    }));
    assert_eq!(extract_promocode(&o), "");
}

#[test]
fn affiliate_id_from_if_pid_meta() {
    let o = order(json!({ "meta_data": [{ "id": 5, "key": "if_pid", "value": "aff-42" }] }));
    assert_eq!(extract_affiliate_id(&o), "aff-42");
}

#[test]
fn affiliate_id_accepts_numeric_value() {
    let o = order(json!({ "meta_data": [{ "key": "if_pid", "value": 42 }] }));
    assert_eq!(extract_affiliate_id(&o), "42");
}

#[test]
fn affiliate_id_is_not_uppercased() {
    let o = order(json!({ "meta_data": [{ "key": "if_pid", "value": "Aff-42" }] }));
    assert_eq!(extract_affiliate_id(&o), "Aff-42");
}

#[test]
fn affiliate_id_is_returned_verbatim() {
    let o = order(json!({ "meta_data": [{ "key": "if_pid", "value": " aff-42 " }] }));
    assert_eq!(extract_affiliate_id(&o), " aff-42 ");
}

#[test]
fn malformed_elements_are_skipped() {
    let o = order(json!({ "meta_data": ["junk", 3, { "key": "if_pid", "value": "ok" }] }));
    assert_eq!(extract_affiliate_id(&o), "ok");
}

#[test]
fn add_derived_fields_sets_both_columns_on_every_order() {
    let batch = vec![
        order(json!({ "id": 1, "coupon_lines": [{ "code": "x1" }] })),
        order(json!({ "id": 2 })),
    ];

    let out = add_derived_fields(batch);

    assert_eq!(out[0]["promocode"], json!("X1"));
    assert_eq!(out[0]["affiliate_id"], json!(""));
    assert_eq!(out[1]["promocode"], json!(""));
    assert_eq!(out[1]["affiliate_id"], json!(""));
}

#[test]
fn custom_rule_uses_value_field() {
    let rule = ExtractionRule::field("shipping_lines", "method_id");
    let o = order(json!({ "shipping_lines": [{ "method_id": "flat_rate" }] }));
    assert_eq!(rule.find(&o).as_deref(), Some("flat_rate"));
}
