//! One-time-secret lifecycle over a TTL key-value store.
//!
//! Per email address the state machine is
//! `NONE -> PENDING (secret stored, TTL running) -> {VERIFIED | EXPIRED | RESET}`.
//! Expiry is enforced by the store itself; this service never re-checks
//! timestamps and treats an absent key as "invalid or expired".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use rand::Rng;
use thiserror::Error;

use tableside_core::{Email, OtpCode};

/// Validity window of a stored secret. No renewal.
pub const OTP_TTL: Duration = Duration::from_secs(15 * 60);

/// The key-value store rejected or lost an operation.
#[derive(Debug, Error)]
#[error("otp store error: {0}")]
pub struct OtpStoreError(pub String);

/// Errors surfaced by [`OtpService::verify`].
#[derive(Debug, Error)]
pub enum OtpError {
    /// No unexpired secret exists for the email. Covers both "never
    /// stored" and "expired" - the store collapses them.
    #[error("no unexpired code stored for this email")]
    Missing,

    /// The candidate did not exactly match the stored secret.
    #[error("code mismatch")]
    Mismatch,

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] OtpStoreError),
}

/// TTL-capable key-value store holding one pending secret per email.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store a secret for the email, overwriting any prior pending secret
    /// and restarting the validity window.
    async fn set(&self, email: &Email, code: OtpCode) -> Result<(), OtpStoreError>;

    /// Fetch the pending secret, if one exists and has not expired.
    async fn get(&self, email: &Email) -> Result<Option<OtpCode>, OtpStoreError>;

    /// Unconditionally remove any pending secret.
    async fn remove(&self, email: &Email) -> Result<(), OtpStoreError>;
}

/// In-process TTL store over a moka future cache.
pub struct MokaOtpStore {
    cache: Cache<String, OtpCode>,
}

impl MokaOtpStore {
    /// Create a store with the standard 15-minute validity window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(OTP_TTL)
    }

    /// Create a store with a custom validity window. Intended for tests
    /// that exercise expiry without waiting 15 minutes.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_live(ttl).build(),
        }
    }
}

impl Default for MokaOtpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OtpStore for MokaOtpStore {
    async fn set(&self, email: &Email, code: OtpCode) -> Result<(), OtpStoreError> {
        self.cache.insert(email.as_str().to_owned(), code).await;
        Ok(())
    }

    async fn get(&self, email: &Email) -> Result<Option<OtpCode>, OtpStoreError> {
        Ok(self.cache.get(email.as_str()).await)
    }

    async fn remove(&self, email: &Email) -> Result<(), OtpStoreError> {
        self.cache.invalidate(email.as_str()).await;
        Ok(())
    }
}

/// Generates, stores, validates, and invalidates one-time secrets.
#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn OtpStore>,
}

impl OtpService {
    /// Create a service over the given store handle.
    #[must_use]
    pub fn new(store: Arc<dyn OtpStore>) -> Self {
        Self { store }
    }

    /// Produce a uniformly random six-digit, zero-padded code.
    ///
    /// Independent of any stored state.
    #[must_use]
    pub fn generate() -> OtpCode {
        OtpCode::from_number(rand::rng().random_range(0..1_000_000))
    }

    /// Generate a fresh code and store it, overwriting any prior pending
    /// code for the email.
    ///
    /// # Errors
    ///
    /// Returns [`OtpStoreError`] if the store write fails.
    pub async fn issue(&self, email: &Email) -> Result<OtpCode, OtpStoreError> {
        let code = Self::generate();
        self.store.set(email, code.clone()).await?;
        Ok(code)
    }

    /// Verify a candidate against the stored secret.
    ///
    /// On a match the secret is cleared, so verification succeeds at most
    /// once per issued code; a repeat attempt fails with
    /// [`OtpError::Missing`].
    ///
    /// # Errors
    ///
    /// - [`OtpError::Missing`] when no unexpired secret exists
    /// - [`OtpError::Mismatch`] when the candidate differs from the secret
    /// - [`OtpError::Store`] when the store itself fails
    pub async fn verify(&self, email: &Email, candidate: &OtpCode) -> Result<(), OtpError> {
        let stored = self.store.get(email).await?.ok_or(OtpError::Missing)?;

        if &stored != candidate {
            return Err(OtpError::Mismatch);
        }

        self.store.remove(email).await?;
        Ok(())
    }

    /// Best-effort removal of any pending secret; a store failure is
    /// logged, not propagated.
    pub async fn clear(&self, email: &Email) {
        if let Err(e) = self.store.remove(email).await {
            tracing::warn!(email = %email, error = %e, "Failed to clear stored OTP");
        }
    }
}
