//! Catalog food item model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tableside_core::FoodId;

/// A menu item in the pricing catalog.
///
/// The catalog is the authoritative source of unit prices; order items copy
/// the price at creation time rather than looking it up again later.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Food {
    /// Entity identity, distinct from the storage primary key.
    pub food_id: FoodId,
    /// Display name.
    pub name: String,
    /// Unit price in the restaurant's currency.
    pub price: Decimal,
    /// Optional image URL.
    pub food_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Food {
    /// Create a new catalog entry with a fresh identity and current timestamps.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, food_image: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            food_id: FoodId::generate(),
            name: name.into(),
            price,
            food_image,
            created_at: now,
            updated_at: now,
        }
    }
}
