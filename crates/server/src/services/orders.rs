//! Order creation pipeline.
//!
//! Turns an incoming order pack into one order row plus one row per line,
//! with server-derived pricing. All reference resolution happens before any
//! write so a bad food id or table id costs nothing.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use tableside_core::{FoodId, OrderId, OrderItemId, TableId};

use crate::db::{
    FoodRepository, OrderItemRepository, OrderRepository, RepositoryError, TableRepository,
};
use crate::models::{Order, OrderItem};

/// One requested line: which catalog item and how many.
#[derive(Debug, Clone)]
pub struct OrderLineRequest {
    pub food_id: FoodId,
    pub quantity: i32,
}

/// A validated order pack ready for the pipeline.
#[derive(Debug, Clone)]
pub struct OrderItemPack {
    pub table_id: TableId,
    pub lines: Vec<OrderLineRequest>,
}

/// Result of a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_item_ids: Vec<OrderItemId>,
}

/// Errors from the order creation pipeline.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Caller-supplied data failed validation.
    #[error("{0}")]
    Validation(String),

    /// The referenced table does not exist.
    #[error("table not found")]
    TableNotFound(TableId),

    /// A referenced catalog item does not exist.
    #[error("food not found")]
    FoodNotFound(FoodId),

    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Pipeline over the catalog, table, order, and order-line repositories.
#[derive(Clone)]
pub struct OrderService {
    foods: Arc<dyn FoodRepository>,
    tables: Arc<dyn TableRepository>,
    orders: Arc<dyn OrderRepository>,
    order_items: Arc<dyn OrderItemRepository>,
}

impl OrderService {
    #[must_use]
    pub fn new(
        foods: Arc<dyn FoodRepository>,
        tables: Arc<dyn TableRepository>,
        orders: Arc<dyn OrderRepository>,
        order_items: Arc<dyn OrderItemRepository>,
    ) -> Self {
        Self {
            foods,
            tables,
            orders,
            order_items,
        }
    }

    /// Place an order: resolve every reference, write the order, then the
    /// lines as one batch.
    ///
    /// Pricing is derived server-side from the catalog at call time; any
    /// price supplied by the caller is ignored. If the batch insert fails
    /// after the order row was written, the order row is deleted so no
    /// half-placed order survives.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] for an empty pack or non-positive
    /// quantity, [`OrderError::TableNotFound`] / [`OrderError::FoodNotFound`]
    /// for dangling references, and [`OrderError::Repository`] for store
    /// failures.
    pub async fn place_order(&self, pack: OrderItemPack) -> Result<PlacedOrder, OrderError> {
        if pack.lines.is_empty() {
            return Err(OrderError::Validation(
                "Order items are required".to_owned(),
            ));
        }
        for line in &pack.lines {
            if line.quantity <= 0 {
                return Err(OrderError::Validation(
                    "Quantity must be positive".to_owned(),
                ));
            }
        }

        if self.tables.get(pack.table_id).await?.is_none() {
            return Err(OrderError::TableNotFound(pack.table_id));
        }

        // Resolve every catalog price before the first write.
        let mut prices: Vec<Decimal> = Vec::with_capacity(pack.lines.len());
        for line in &pack.lines {
            let food = self
                .foods
                .get(line.food_id)
                .await?
                .ok_or(OrderError::FoodNotFound(line.food_id))?;
            prices.push(food.price);
        }

        let order = Order::new(Some(pack.table_id));
        self.orders.insert(&order).await?;

        let items: Vec<OrderItem> = pack
            .lines
            .iter()
            .zip(prices)
            .map(|(line, price)| OrderItem::new(order.order_id, line.food_id, line.quantity, price))
            .collect();

        if let Err(e) = self.order_items.insert_many(&items).await {
            tracing::error!(
                order_id = %order.order_id,
                error = %e,
                "Order item batch insert failed, removing order"
            );
            if let Err(del_err) = self.orders.delete(order.order_id).await {
                tracing::error!(
                    order_id = %order.order_id,
                    error = %del_err,
                    "Failed to remove order after batch failure"
                );
            }
            return Err(e.into());
        }

        tracing::info!(
            order_id = %order.order_id,
            items = items.len(),
            "Order placed"
        );

        Ok(PlacedOrder {
            order_id: order.order_id,
            order_item_ids: items.iter().map(|i| i.order_item_id).collect(),
        })
    }
}
