//! Validates the table definition shipped in `config/`.

use std::path::PathBuf;

use wooetl_core::{load_table_config, ColumnMode, ColumnType, NestedPolicy};

fn shipped_table_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/orders_table.yaml")
}

#[test]
fn shipped_table_config_loads() {
    let table = load_table_config(&shipped_table_path()).expect("shipped config should be valid");
    assert_eq!(table.dataset, "woocommerce");
    assert_eq!(table.table, "orders");
    assert_eq!(table.partition_field.as_deref(), Some("date_created"));
    assert_eq!(table.sanitize.line_item_meta_data, NestedPolicy::Filter);
    assert_eq!(table.sanitize.refunds, NestedPolicy::Filter);
}

#[test]
fn shipped_table_declares_derived_columns() {
    let table = load_table_config(&shipped_table_path()).unwrap();
    for name in [
        "promocode",
        "affiliate_id",
        "country_2symbols",
        "country_readable",
        "international_phone",
    ] {
        let column = table
            .column(name)
            .unwrap_or_else(|| panic!("missing derived column {name}"));
        assert_eq!(column.column_type, ColumnType::String);
    }
}

#[test]
fn shipped_line_items_match_sanitizer_allow_list() {
    let table = load_table_config(&shipped_table_path()).unwrap();
    let line_items = table.column("line_items").unwrap();
    assert_eq!(line_items.mode, ColumnMode::Repeated);
    let names: Vec<&str> = line_items.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "name",
            "product_id",
            "variation_id",
            "quantity",
            "subtotal",
            "subtotal_tax",
            "total",
            "total_tax",
            "sku",
            "price",
            "parent_name",
            "meta_data",
            "taxes",
            "image",
        ]
    );
}
