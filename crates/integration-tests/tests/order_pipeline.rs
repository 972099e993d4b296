//! End-to-end tests for order placement.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use tableside_integration_tests::TestApp;

fn dec(s: &str) -> rust_decimal::Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_place_order_returns_ids() {
    let app = TestApp::new();
    let table_id = app.seed_table(4).await;
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [{ "food_id": food_id.to_string(), "quantity": 2 }],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["order_id"].is_string());
    assert_eq!(body["order_item_ids"].as_array().unwrap().len(), 1);
    assert_eq!(app.store.order_item_count().await, 1);
}

#[tokio::test]
async fn test_missing_table_id_is_rejected() {
    let app = TestApp::new();
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "order_items": [{ "food_id": food_id.to_string(), "quantity": 1 }],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Table ID is required");
}

#[tokio::test]
async fn test_missing_order_items_is_rejected() {
    let app = TestApp::new();
    let table_id = app.seed_table(4).await;

    let (status, body) = app
        .post("/order-items", &json!({ "table_id": table_id.to_string() }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order items are required");

    // An empty list is treated the same as a missing one.
    let (status, body) = app
        .post(
            "/order-items",
            &json!({ "table_id": table_id.to_string(), "order_items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order items are required");
}

#[tokio::test]
async fn test_missing_line_fields_are_rejected() {
    let app = TestApp::new();
    let table_id = app.seed_table(4).await;
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [{ "quantity": 1 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Food ID is required");

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [{ "food_id": food_id.to_string() }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity is required");
}

#[tokio::test]
async fn test_malformed_ids_are_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": "not-a-uuid",
                "order_items": [{ "food_id": "also-not", "quantity": 1 }],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid table ID");
}

#[tokio::test]
async fn test_unknown_table_reports_not_found() {
    let app = TestApp::new();
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": "00000000-0000-4000-8000-000000000000",
                "order_items": [{ "food_id": food_id.to_string(), "quantity": 1 }],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Table not found");
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_unknown_food_leaves_nothing_persisted() {
    let app = TestApp::new();
    let table_id = app.seed_table(4).await;

    let (status, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [
                    { "food_id": "00000000-0000-4000-8000-000000000000", "quantity": 1 },
                ],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Food not found");
    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.order_item_count().await, 0);
}

#[tokio::test]
async fn test_batch_failure_leaves_no_orphan_order() {
    let app = TestApp::new();
    let table_id = app.seed_table(4).await;
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    app.store.fail_next_order_item_batch();

    let (status, _) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [{ "food_id": food_id.to_string(), "quantity": 1 }],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.order_count().await, 0);
    assert_eq!(app.store.order_item_count().await, 0);
}
