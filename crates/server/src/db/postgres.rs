//! `PostgreSQL` repositories.
//!
//! Runtime-checked queries (no offline preparation step); the schema lives
//! in `crates/server/migrations/`.

use async_trait::async_trait;
use sqlx::PgPool;

use tableside_core::{Email, FoodId, OrderId, TableId};

use super::{
    FoodRepository, OrderItemRepository, OrderRepository, RepositoryError, TableRepository,
    UserRepository,
};
use crate::models::{Food, Order, OrderItem, Table, User};

/// All repository traits implemented over one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store backed by the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for health checks.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FoodRepository for PgStore {
    async fn get(&self, id: FoodId) -> Result<Option<Food>, RepositoryError> {
        let food = sqlx::query_as::<_, Food>(
            "SELECT food_id, name, price, food_image, created_at, updated_at
             FROM food WHERE food_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(food)
    }

    async fn insert(&self, food: &Food) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO food (food_id, name, price, food_image, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(food.food_id)
        .bind(&food.name)
        .bind(food.price)
        .bind(&food.food_image)
        .bind(food.created_at)
        .bind(food.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TableRepository for PgStore {
    async fn get(&self, id: TableId) -> Result<Option<Table>, RepositoryError> {
        let table = sqlx::query_as::<_, Table>(
            "SELECT table_id, table_number, number_of_guests, created_at, updated_at
             FROM dining_table WHERE table_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    async fn insert(&self, table: &Table) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO dining_table
                 (table_id, table_number, number_of_guests, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(table.table_id)
        .bind(table.table_number)
        .bind(table.number_of_guests)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT order_id, table_id, order_date, created_at, updated_at
             FROM restaurant_order WHERE order_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO restaurant_order
                 (order_id, table_id, order_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order.order_id)
        .bind(order.table_id)
        .bind(order.order_date)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM restaurant_order WHERE order_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderItemRepository for PgStore {
    async fn insert_many(&self, items: &[OrderItem]) -> Result<(), RepositoryError> {
        // One transaction so a mid-batch failure leaves no partial lines.
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_item
                     (order_item_id, order_id, food_id, quantity,
                      unit_price, total_price, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(item.order_item_id)
            .bind(item.order_id)
            .bind(item.food_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT order_item_id, order_id, food_id, quantity,
                    unit_price, total_price, created_at, updated_at
             FROM order_item WHERE order_id = $1
             ORDER BY created_at, order_item_id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, first_name, last_name, email, password_hash,
                    phone, verified, created_at, updated_at
             FROM account WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO account
                 (user_id, first_name, last_name, email, password_hash,
                  phone, verified, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    async fn set_verified(&self, email: &Email) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE account SET verified = TRUE, updated_at = NOW() WHERE email = $1")
                .bind(email)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE account SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
