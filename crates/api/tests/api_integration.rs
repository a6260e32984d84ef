//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> Router {
    let state = api::create_default_state();
    api::create_app(state, get_metrics_handle())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Registers a product and provisions stock for it, returning the product ID.
async fn seed_product_with_stock(app: &Router, sku: &str, available: u32) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/products",
        Some(json!({ "sku": sku, "name": format!("{sku} Widget"), "is_active": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        app,
        "POST",
        "/api/v1/inventories",
        Some(json!({
            "product_id": product_id,
            "warehouse_id": 1,
            "quantity_available": available,
            "reorder_level": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    product_id
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_order_happy_path() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-001", 10).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "customer_id": 1,
            "shipping_address": "12 North Quay",
            "items": [{
                "product_id": product_id,
                "quantity": 2,
                "unit_price_cents": 1000
            }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["total_amount_cents"], 2000);
    // Name backfilled from the catalog.
    assert_eq!(body["data"]["items"][0]["product_name"], "SKU-001 Widget");

    // The reservation is visible through the inventory API.
    let (_, inventory) = send(
        &app,
        "GET",
        &format!("/api/v1/inventories/product/{product_id}/warehouse/1"),
        None,
    )
    .await;
    assert_eq!(inventory["data"]["quantity_available"], 8);
    assert_eq!(inventory["data"]["quantity_reserved"], 2);
}

#[tokio::test]
async fn test_create_order_without_items_is_rejected() {
    let app = setup();

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({ "customer_id": 1, "items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["error_code"], "ERR_003");
    assert_eq!(body["message"], "Order must contain at least one item");
}

#[tokio::test]
async fn test_create_order_insufficient_stock() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-002", 3).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "customer_id": 1,
            "items": [{ "product_id": product_id, "quantity": 5, "unit_price_cents": 100 }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Available: 3, Requested: 5"));
}

#[tokio::test]
async fn test_get_missing_order_is_404() {
    let app = setup();
    let (status, body) = send(&app, "GET", "/api/v1/orders/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["error_code"], "ORD_001");
}

#[tokio::test]
async fn test_status_transitions_and_delete_rules() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-003", 10).await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "customer_id": 7,
            "items": [{ "product_id": product_id, "quantity": 1, "unit_price_cents": 100 }]
        })),
    )
    .await;
    let order_id = created["data"]["id"].as_i64().unwrap();

    // PENDING -> CONFIRMED is accepted.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}/status?status=CONFIRMED"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "CONFIRMED");

    // A CONFIRMED order cannot be deleted.
    let (status, body) = send(&app, "DELETE", &format!("/api/v1/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["error_code"], "ORD_004");

    // Cancel it; the reservation is released.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}/status?status=CANCELLED"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, inventory) = send(
        &app,
        "GET",
        &format!("/api/v1/inventories/product/{product_id}/warehouse/1"),
        None,
    )
    .await;
    assert_eq!(inventory["data"]["quantity_reserved"], 0);
    assert_eq!(inventory["data"]["quantity_available"], 10);

    // CANCELLED is terminal.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}/status?status=PENDING"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["error_code"], "ORD_005");

    // A CANCELLED order can be deleted.
    let (status, _) = send(&app, "DELETE", &format!("/api/v1/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let app = setup();
    let (status, body) = send(&app, "GET", "/api/v1/orders/status/SHIPPING", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["error_code"], "ERR_004");
}

#[tokio::test]
async fn test_reserve_and_release_endpoints() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-004", 10).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/inventories/product/{product_id}/reserve?quantity=4"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity_available"], 6);
    assert_eq!(body["data"]["quantity_reserved"], 4);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/inventories/product/{product_id}/release?quantity=4"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity_available"], 10);

    // Releasing more than reserved conflicts.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/inventories/product/{product_id}/release?quantity=1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["error_code"], "INV_003");
}

#[tokio::test]
async fn test_zero_quantity_reserve_is_rejected_at_the_boundary() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-005", 10).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/inventories/product/{product_id}/reserve?quantity=0"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Quantity must be greater than zero");
}

#[tokio::test]
async fn test_inventory_adjust_and_low_stock() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-006", 50).await;

    let (_, records) = send(
        &app,
        "GET",
        &format!("/api/v1/inventories/product/{product_id}"),
        None,
    )
    .await;
    let inventory_id = records["data"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/inventories/{inventory_id}/adjust?quantity=-47"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity_available"], 3);
    assert_eq!(body["data"]["is_low_stock"], true);

    let (_, low) = send(&app, "GET", "/api/v1/inventories/low-stock", None).await;
    assert_eq!(low["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_count_orders_by_customer() {
    let app = setup();
    let product_id = seed_product_with_stock(&app, "SKU-007", 100).await;

    for _ in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/orders",
            Some(json!({
                "customer_id": 9,
                "items": [{ "product_id": product_id, "quantity": 1, "unit_price_cents": 100 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/v1/orders/customer/9/count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], 3);

    let (_, none) = send(&app, "GET", "/api/v1/orders/customer/10/count", None).await;
    assert_eq!(none["data"], 0);
}
