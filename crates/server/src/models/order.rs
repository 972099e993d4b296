//! Order and order item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tableside_core::{FoodId, OrderId, OrderItemId, TableId};

/// A placed order, optionally tied to a dining table.
///
/// Invariant: when `table_id` is present it resolved to an existing table at
/// creation time. The aggregation layer still tolerates a table that has
/// since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    /// Entity identity, distinct from the storage primary key.
    pub order_id: OrderId,
    /// Table the order was placed for, if any.
    pub table_id: Option<TableId>,
    /// When the order was taken.
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with a fresh identity and current timestamps.
    #[must_use]
    pub fn new(table_id: Option<TableId>) -> Self {
        let now = Utc::now();
        Self {
            order_id: OrderId::generate(),
            table_id,
            order_date: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single line of an order.
///
/// Invariant: `unit_price` is the catalog price at creation time and
/// `total_price = unit_price * quantity`. Both are derived server-side and
/// never trusted from the caller.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Entity identity, distinct from the storage primary key.
    pub order_item_id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Catalog item this line refers to.
    pub food_id: FoodId,
    /// Number of units ordered. Always positive.
    pub quantity: i32,
    /// Catalog unit price captured at creation time.
    pub unit_price: Decimal,
    /// `unit_price * quantity`, computed at creation time.
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    /// Build an order line, deriving `total_price` from the unit price.
    #[must_use]
    pub fn new(order_id: OrderId, food_id: FoodId, quantity: i32, unit_price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            order_item_id: OrderItemId::generate(),
            order_id,
            food_id,
            quantity,
            unit_price,
            total_price: unit_price * Decimal::from(quantity),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_total_price_derivation() {
        let item = OrderItem::new(OrderId::generate(), FoodId::generate(), 2, dec("9.5"));
        assert_eq!(item.unit_price, dec("9.5"));
        assert_eq!(item.total_price, dec("19.0"));
    }

    #[test]
    fn test_quantity_one_total_equals_unit() {
        let item = OrderItem::new(OrderId::generate(), FoodId::generate(), 1, dec("3.25"));
        assert_eq!(item.total_price, item.unit_price);
    }
}
