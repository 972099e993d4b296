//! Order placement and billing report handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use tableside_core::{FoodId, OrderId, TableId};

use crate::error::{AppError, Result};
use crate::services::billing::BillingReport;
use crate::services::orders::{OrderItemPack, OrderLineRequest};
use crate::state::AppState;

/// Body of `POST /order-items`.
///
/// Fields arrive optional and are validated explicitly so each miss gets its
/// own message instead of a generic deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateOrderItemsRequest {
    pub table_id: Option<String>,
    pub order_items: Option<Vec<OrderLineBody>>,
}

/// One requested line in the order body.
#[derive(Debug, Deserialize)]
pub struct OrderLineBody {
    pub food_id: Option<String>,
    pub quantity: Option<i32>,
}

impl CreateOrderItemsRequest {
    fn into_pack(self) -> Result<OrderItemPack> {
        let table_id = self
            .table_id
            .ok_or_else(|| AppError::Validation("Table ID is required".to_owned()))?;
        let table_id: TableId = table_id
            .parse()
            .map_err(|_| AppError::Validation("Invalid table ID".to_owned()))?;

        let bodies = self
            .order_items
            .filter(|items| !items.is_empty())
            .ok_or_else(|| AppError::Validation("Order items are required".to_owned()))?;

        let mut lines = Vec::with_capacity(bodies.len());
        for body in bodies {
            let food_id = body
                .food_id
                .ok_or_else(|| AppError::Validation("Food ID is required".to_owned()))?;
            let food_id: FoodId = food_id
                .parse()
                .map_err(|_| AppError::Validation("Invalid food ID".to_owned()))?;
            let quantity = body
                .quantity
                .ok_or_else(|| AppError::Validation("Quantity is required".to_owned()))?;
            lines.push(OrderLineRequest { food_id, quantity });
        }

        Ok(OrderItemPack { table_id, lines })
    }
}

/// `POST /order-items` - place an order with its items.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderItemsRequest>,
) -> Result<Json<Value>> {
    let pack = body.into_pack()?;
    let placed = state.orders().place_order(pack).await?;

    Ok(Json(json!({
        "order_id": placed.order_id,
        "order_item_ids": placed.order_item_ids,
    })))
}

/// `GET /order-items/order/{order_id}` - billing report for an order.
#[instrument(skip(state))]
pub async fn bill(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<BillingReport>>> {
    let order_id: OrderId = order_id
        .parse()
        .map_err(|_| AppError::Validation("Invalid order ID".to_owned()))?;

    let reports = state.billing().order_bill(order_id).await?;
    Ok(Json(reports))
}
