//! Integration tests for `WooClient::fetch_orders_for_date`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wooetl_woo::{WooClient, WooError};

const ORDERS_PATH: &str = "/wp-json/wc/v3/orders";

fn test_client(server: &MockServer) -> WooClient {
    WooClient::new(&server.uri(), "ck_test", "cs_test", 5, "wooetl-test/0.1", 100)
        .expect("failed to build test WooClient")
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn order_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "status": "completed",
        "total": "49.90",
        "billing": { "country": "US", "phone": "(415) 555-2671" },
        "coupon_lines": [],
        "meta_data": [],
        "line_items": [],
        "refunds": []
    })
}

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_first_page_returns_no_orders() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!([])).await;

    let orders = test_client(&server)
        .fetch_orders_for_date(day())
        .await
        .expect("empty day should succeed");

    assert!(orders.is_empty(), "expected no orders, got {}", orders.len());
}

#[tokio::test]
async fn concatenates_pages_until_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!([order_json(1), order_json(2)])).await;
    mount_page(&server, "2", json!([order_json(3)])).await;
    mount_page(&server, "3", json!([])).await;

    let orders = test_client(&server)
        .fetch_orders_for_date(day())
        .await
        .expect("multi-page fetch should succeed");

    let ids: Vec<i64> = orders
        .iter()
        .map(|o| o.get("id").and_then(serde_json::Value::as_i64).unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3], "orders must keep page order");
}

#[tokio::test]
async fn sends_basic_auth_and_day_bounds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(basic_auth("ck_test", "cs_test"))
        .and(query_param("per_page", "100"))
        .and(query_param("after", "2024-05-01T00:00:00Z"))
        .and(query_param("before", "2024-05-01T23:59:59Z"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_json(7)])))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "2", json!([])).await;

    let orders = test_client(&server).fetch_orders_for_date(day()).await.unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn preserves_heterogeneous_nested_shapes() {
    let server = MockServer::start().await;
    let raw = json!([{
        "id": 11,
        "meta_data": [
            { "id": 1, "key": "if_pid", "value": "aff-42" },
            { "id": 2, "key": "_wc_points", "value": { "earned": 10 } }
        ],
        "refunds": null
    }]);
    mount_page(&server, "1", raw).await;
    mount_page(&server, "2", json!([])).await;

    let orders = test_client(&server).fetch_orders_for_date(day()).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["meta_data"][1]["value"]["earned"], json!(10));
    assert!(orders[0]["refunds"].is_null());
}

// ---------------------------------------------------------------------------
// Error paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_is_reported_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "woocommerce_rest_cannot_view",
            "message": "Sorry, you cannot list resources."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_orders_for_date(day())
        .await
        .expect_err("401 should fail the fetch");

    assert!(
        matches!(err, WooError::Unauthorized { status: 401, .. }),
        "expected Unauthorized(401), got: {err:?}"
    );
}

#[tokio::test]
async fn server_error_on_later_page_discards_earlier_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!([order_json(1)])).await;

    Mock::given(method("GET"))
        .and(path(ORDERS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .fetch_orders_for_date(day())
        .await
        .expect_err("502 should fail the whole day");

    assert!(
        matches!(err, WooError::UnexpectedStatus { status: 502, .. }),
        "expected UnexpectedStatus(502), got: {err:?}"
    );
}

#[tokio::test]
async fn non_array_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!({ "orders": [] })).await;

    let err = test_client(&server)
        .fetch_orders_for_date(day())
        .await
        .expect_err("object body should not parse as a page");

    assert!(
        matches!(err, WooError::Deserialize { ref context, .. } if context.contains("page 1")),
        "expected Deserialize naming page 1, got: {err:?}"
    );
}

#[tokio::test]
async fn non_object_element_is_a_deserialize_error() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!([order_json(1), 42])).await;

    let err = test_client(&server)
        .fetch_orders_for_date(day())
        .await
        .expect_err("scalar order should not parse");

    assert!(matches!(err, WooError::Deserialize { .. }), "got: {err:?}");
}
