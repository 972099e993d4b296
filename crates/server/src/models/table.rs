//! Dining table model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tableside_core::TableId;

/// A dining table that orders can reference.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Table {
    /// Entity identity, distinct from the storage primary key.
    pub table_id: TableId,
    /// Human-facing table number.
    pub table_number: i32,
    /// Seats at the table.
    pub number_of_guests: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Table {
    /// Create a new table with a fresh identity and current timestamps.
    #[must_use]
    pub fn new(table_number: i32, number_of_guests: i32) -> Self {
        let now = Utc::now();
        Self {
            table_id: TableId::generate(),
            table_number,
            number_of_guests,
            created_at: now,
            updated_at: now,
        }
    }
}
