//! Account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tableside_core::{Email, UserId};

/// A back-office account.
///
/// The password hash is argon2-encoded and never serialized into responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Entity identity, distinct from the storage primary key.
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Unique account email; also the OTP store key.
    pub email: Email,
    /// Argon2 PHC-format password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    /// Set once the account's email has been proven via OTP.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new unverified account with a fresh identity.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Email,
        password_hash: impl Into<String>,
        phone: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::generate(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            password_hash: password_hash.into(),
            phone,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}
