//! In-memory repositories.
//!
//! Backs the integration tests (and local experimentation) with the same
//! trait surface as [`super::postgres::PgStore`]. Writes can be made to fail
//! once on demand to exercise the compensation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tableside_core::{Email, FoodId, OrderId, TableId};

use super::{
    FoodRepository, OrderItemRepository, OrderRepository, RepositoryError, TableRepository,
    UserRepository,
};
use crate::models::{Food, Order, OrderItem, Table, User};

/// All repository traits implemented over tokio-synchronized maps.
#[derive(Default)]
pub struct MemoryStore {
    foods: RwLock<HashMap<FoodId, Food>>,
    tables: RwLock<HashMap<TableId, Table>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    order_items: RwLock<Vec<OrderItem>>,
    users: RwLock<HashMap<Email, User>>,
    fail_next_item_batch: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert_many` of order items fail with
    /// [`RepositoryError::Unavailable`]. One-shot.
    pub fn fail_next_order_item_batch(&self) {
        self.fail_next_item_batch.store(true, Ordering::SeqCst);
    }

    /// Number of persisted order items (across all orders).
    pub async fn order_item_count(&self) -> usize {
        self.order_items.read().await.len()
    }

    /// Number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl FoodRepository for MemoryStore {
    async fn get(&self, id: FoodId) -> Result<Option<Food>, RepositoryError> {
        Ok(self.foods.read().await.get(&id).cloned())
    }

    async fn insert(&self, food: &Food) -> Result<(), RepositoryError> {
        self.foods.write().await.insert(food.food_id, food.clone());
        Ok(())
    }
}

#[async_trait]
impl TableRepository for MemoryStore {
    async fn get(&self, id: TableId) -> Result<Option<Table>, RepositoryError> {
        Ok(self.tables.read().await.get(&id).cloned())
    }

    async fn insert(&self, table: &Table) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .insert(table.table_id, table.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        self.orders
            .write()
            .await
            .insert(order.order_id, order.clone());
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl OrderItemRepository for MemoryStore {
    async fn insert_many(&self, items: &[OrderItem]) -> Result<(), RepositoryError> {
        if self.fail_next_item_batch.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "injected order item batch failure".to_owned(),
            ));
        }

        self.order_items.write().await.extend_from_slice(items);
        Ok(())
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        Ok(self
            .order_items
            .read()
            .await
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn set_verified(&self, email: &Email) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.verified = true;
                user.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        match users.get_mut(email) {
            Some(user) => {
                user.password_hash = password_hash.to_owned();
                user.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_injected_batch_failure_is_one_shot() {
        let store = MemoryStore::new();
        let item = OrderItem::new(
            OrderId::generate(),
            FoodId::generate(),
            1,
            Decimal::from(5),
        );

        store.fail_next_order_item_batch();
        assert!(store.insert_many(std::slice::from_ref(&item)).await.is_err());
        assert!(store.insert_many(std::slice::from_ref(&item)).await.is_ok());
        assert_eq!(store.order_item_count().await, 1);
    }

    #[tokio::test]
    async fn test_user_insert_conflicts_on_duplicate_email() {
        let store = MemoryStore::new();
        let email = Email::parse("a@b.com").unwrap();
        let user = User::new("Ada", "Lovelace", email.clone(), "hash", None);

        UserRepository::insert(&store, &user).await.unwrap();
        let dup = User::new("Ada", "Again", email, "hash", None);
        assert!(matches!(
            UserRepository::insert(&store, &dup).await,
            Err(RepositoryError::Conflict(_))
        ));
    }
}
