//! Billing report aggregation.
//!
//! Joins order lines with the catalog, owning order, and table records into
//! per-order billing reports. Joins are left joins: a dangling reference
//! leaves the affected fields empty instead of failing the report.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use tableside_core::{OrderId, TableId};

use crate::db::{
    FoodRepository, OrderItemRepository, OrderRepository, RepositoryError, TableRepository,
};

/// One projected order line in a billing report.
#[derive(Debug, Clone, Serialize)]
pub struct BillLine {
    /// Line total (`unit_price * quantity`). Sums into `payment_due`.
    pub amount: Option<Decimal>,
    /// Always 1; each line counts once toward `total_count`.
    pub total_count: i64,
    pub food_name: Option<String>,
    pub food_image: Option<String>,
    pub table_number: Option<i32>,
    pub table_id: Option<TableId>,
    pub order_id: Option<OrderId>,
    /// Catalog unit price captured when the line was created.
    pub price: Option<Decimal>,
    pub quantity: i32,
}

/// The aggregated per-order billing view.
#[derive(Debug, Clone, Serialize)]
pub struct BillingReport {
    /// Sum of line amounts across the group.
    pub payment_due: Decimal,
    /// Number of lines in the group.
    pub total_count: i64,
    pub table_number: Option<i32>,
    pub order_items: Vec<BillLine>,
}

/// Errors from the aggregation engine.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Underlying store failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Aggregation over the order-line, catalog, order, and table repositories.
#[derive(Clone)]
pub struct BillingService {
    foods: Arc<dyn FoodRepository>,
    tables: Arc<dyn TableRepository>,
    orders: Arc<dyn OrderRepository>,
    order_items: Arc<dyn OrderItemRepository>,
}

impl BillingService {
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

    /// Build the billing report(s) for one order.
    ///
    /// An order id matching zero lines yields an empty vec, not an error;
    /// this layer does not distinguish "no items" from "unknown id". Lines
    /// whose joins all resolve the same way share a group, so a well-formed
    /// order produces exactly one report.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::Repository`] only for store failures; dangling
    /// food/order/table references are tolerated as absent fields.
    pub async fn order_bill(&self, order_id: OrderId) -> Result<Vec<BillingReport>, BillingError> {
        let items = self.order_items.find_by_order(order_id).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // The owning order and its table resolve once for the whole batch.
        let order = self.orders.get(order_id).await?;
        let table = match order.as_ref().and_then(|o| o.table_id) {
            Some(table_id) => self.tables.get(table_id).await?,
            None => None,
        };

        let mut lines: Vec<BillLine> = Vec::with_capacity(items.len());
        for item in &items {
            let food = self.foods.get(item.food_id).await?;

            lines.push(BillLine {
                amount: Some(item.total_price),
                total_count: 1,
                food_name: food.as_ref().map(|f| f.name.clone()),
                food_image: food.as_ref().and_then(|f| f.food_image.clone()),
                table_number: table.as_ref().map(|t| t.table_number),
                table_id: table.as_ref().map(|t| t.table_id),
                order_id: order.as_ref().map(|o| o.order_id),
                price: Some(item.unit_price),
                quantity: item.quantity,
            });
        }

        // Group by (order_id, table_id, table_number), preserving insertion
        // order of first appearance.
        let mut groups: Vec<(GroupKey, Vec<BillLine>)> = Vec::new();
        for line in lines {
            let key = GroupKey {
                order_id: line.order_id,
                table_id: line.table_id,
                table_number: line.table_number,
            };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, group)) => group.push(line),
                None => groups.push((key, vec![line])),
            }
        }

        Ok(groups
            .into_iter()
            .map(|(key, group)| BillingReport {
                payment_due: group.iter().filter_map(|l| l.amount).sum(),
                total_count: group.len() as i64,
                table_number: key.table_number,
                order_items: group,
            })
            .collect())
    }
}

#[derive(Debug, PartialEq, Eq)]
struct GroupKey {
    order_id: Option<OrderId>,
    table_id: Option<TableId>,
    table_number: Option<i32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::{Food, Order, OrderItem, Table};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn service(store: &Arc<MemoryStore>) -> BillingService {
        BillingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        )
    }

    #[tokio::test]
    async fn test_single_line_report() {
        let store = Arc::new(MemoryStore::new());
        let table = Table::new(7, 2);
        let food = Food::new("Margherita", dec("9.5"), None);
        let order = Order::new(Some(table.table_id));
        let item = OrderItem::new(order.order_id, food.food_id, 2, food.price);

        TableRepository::insert(store.as_ref(), &table)
            .await
            .unwrap();
        FoodRepository::insert(store.as_ref(), &food).await.unwrap();
        OrderRepository::insert(store.as_ref(), &order)
            .await
            .unwrap();
        store
            .insert_many(std::slice::from_ref(&item))
            .await
            .unwrap();

        let reports = service(&store).order_bill(order.order_id).await.unwrap();
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        assert_eq!(report.payment_due, dec("19.0"));
        assert_eq!(report.total_count, 1);
        assert_eq!(report.table_number, Some(7));
        assert_eq!(report.order_items.len(), 1);
        assert_eq!(report.order_items[0].food_name.as_deref(), Some("Margherita"));
        assert_eq!(report.order_items[0].price, Some(dec("9.5")));
        assert_eq!(report.order_items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_payment_due_sums_all_lines() {
        let store = Arc::new(MemoryStore::new());
        let table = Table::new(3, 4);
        let pizza = Food::new("Margherita", dec("9.5"), None);
        let pasta = Food::new("Carbonara", dec("12.25"), None);
        let order = Order::new(Some(table.table_id));

        TableRepository::insert(store.as_ref(), &table)
            .await
            .unwrap();
        FoodRepository::insert(store.as_ref(), &pizza)
            .await
            .unwrap();
        FoodRepository::insert(store.as_ref(), &pasta)
            .await
            .unwrap();
        OrderRepository::insert(store.as_ref(), &order)
            .await
            .unwrap();
        store
            .insert_many(&[
                OrderItem::new(order.order_id, pizza.food_id, 2, pizza.price),
                OrderItem::new(order.order_id, pasta.food_id, 1, pasta.price),
            ])
            .await
            .unwrap();

        let reports = service(&store).order_bill(order.order_id).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].payment_due, dec("31.25"));
        assert_eq!(reports[0].total_count, 2);
    }

    #[tokio::test]
    async fn test_unknown_order_yields_empty_report() {
        let store = Arc::new(MemoryStore::new());
        let reports = service(&store)
            .order_bill(OrderId::generate())
            .await
            .unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn test_dangling_food_reference_tolerated() {
        let store = Arc::new(MemoryStore::new());
        let order = Order::new(None);
        // The catalog entry is never inserted.
        let item = OrderItem::new(order.order_id, tableside_core::FoodId::generate(), 1, dec("5"));

        OrderRepository::insert(store.as_ref(), &order)
            .await
            .unwrap();
        store
            .insert_many(std::slice::from_ref(&item))
            .await
            .unwrap();

        let reports = service(&store).order_bill(order.order_id).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].table_number, None);
        assert!(reports[0].order_items[0].food_name.is_none());
        assert_eq!(reports[0].payment_due, dec("5"));
    }

    #[tokio::test]
    async fn test_deleted_order_row_leaves_absent_fields() {
        let store = Arc::new(MemoryStore::new());
        let food = Food::new("Margherita", dec("9.5"), None);
        let order = Order::new(None);
        let item = OrderItem::new(order.order_id, food.food_id, 1, food.price);

        FoodRepository::insert(store.as_ref(), &food).await.unwrap();
        store
            .insert_many(std::slice::from_ref(&item))
            .await
            .unwrap();
        // Order row itself was never written.

        let reports = service(&store).order_bill(order.order_id).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].order_items[0].order_id.is_none());
        assert_eq!(reports[0].payment_due, dec("9.5"));
    }
}
