//! End-to-end tests for the billing report endpoint.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use tableside_integration_tests::TestApp;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Decimals serialize as JSON strings; tolerate numbers too.
fn as_decimal(v: &Value) -> Decimal {
    match v {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal value: {other}"),
    }
}

#[tokio::test]
async fn test_bill_for_placed_order() {
    let app = TestApp::new();
    let table_id = app.seed_table(7).await;
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    let (_, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [{ "food_id": food_id.to_string(), "quantity": 2 }],
            }),
        )
        .await;
    let order_id = body["order_id"].as_str().unwrap().to_owned();

    let (status, reports) = app.get(&format!("/order-items/order/{order_id}")).await;

    assert_eq!(status, StatusCode::OK);
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports[0];
    assert_eq!(as_decimal(&report["payment_due"]), dec("19.0"));
    assert_eq!(report["total_count"], 1);
    assert_eq!(report["table_number"], 7);

    let items = report["order_items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["food_name"], "Margherita");
    assert_eq!(as_decimal(&items[0]["price"]), dec("9.5"));
    assert_eq!(as_decimal(&items[0]["amount"]), dec("19.0"));
    assert_eq!(items[0]["quantity"], 2);
}

#[tokio::test]
async fn test_bill_sums_across_lines() {
    let app = TestApp::new();
    let table_id = app.seed_table(3).await;
    let pizza = app.seed_food("Margherita", dec("9.5")).await;
    let pasta = app.seed_food("Carbonara", dec("12.25")).await;

    let (_, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [
                    { "food_id": pizza.to_string(), "quantity": 2 },
                    { "food_id": pasta.to_string(), "quantity": 1 },
                ],
            }),
        )
        .await;
    let order_id = body["order_id"].as_str().unwrap().to_owned();

    let (status, reports) = app.get(&format!("/order-items/order/{order_id}")).await;

    assert_eq!(status, StatusCode::OK);
    let report = &reports.as_array().unwrap()[0];
    assert_eq!(as_decimal(&report["payment_due"]), dec("31.25"));
    assert_eq!(report["total_count"], 2);
}

#[tokio::test]
async fn test_unknown_order_yields_empty_list() {
    let app = TestApp::new();

    let (status, reports) = app
        .get("/order-items/order/00000000-0000-4000-8000-000000000000")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reports, json!([]));
}

#[tokio::test]
async fn test_malformed_order_id_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.get("/order-items/order/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid order ID");
}

#[tokio::test]
async fn test_price_captured_at_creation_survives_catalog_change() {
    let app = TestApp::new();
    let table_id = app.seed_table(1).await;
    let food_id = app.seed_food("Margherita", dec("9.5")).await;

    let (_, body) = app
        .post(
            "/order-items",
            &json!({
                "table_id": table_id.to_string(),
                "order_items": [{ "food_id": food_id.to_string(), "quantity": 1 }],
            }),
        )
        .await;
    let order_id = body["order_id"].as_str().unwrap().to_owned();

    // Catalog price changes after the order was placed. The in-memory insert
    // overwrites the existing entry; only the captured line price must show.
    let updated = tableside_server::models::Food {
        food_id,
        ..tableside_server::models::Food::new("Margherita", dec("99"), None)
    };
    tableside_server::db::FoodRepository::insert(app.store.as_ref(), &updated)
        .await
        .unwrap();

    let (_, reports) = app.get(&format!("/order-items/order/{order_id}")).await;
    let report = &reports.as_array().unwrap()[0];
    assert_eq!(as_decimal(&report["order_items"][0]["price"]), dec("9.5"));
    assert_eq!(as_decimal(&report["payment_due"]), dec("9.5"));
}
