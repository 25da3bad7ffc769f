//! Password hashing
//!
//! Thin wrapper over bcrypt with a configurable work factor.

use thiserror::Error;
use tracing::warn;

/// Errors that can occur while hashing a password
#[derive(Error, Debug)]
pub enum PasswordError {
    /// bcrypt rejected the input or the cost
    #[error("Failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// The blocking hash task was cancelled or panicked
    #[error("Hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Salted, adaptive password hashing
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Configured bcrypt cost
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh salt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A stored hash bcrypt cannot parse counts as a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_blocking(&self, password: String) -> Result<String, PasswordError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// [`verify`](Self::verify) on the blocking pool. A failed task counts as a mismatch.
    pub async fn verify_blocking(&self, plaintext: String, hash: String) -> bool {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .unwrap_or(false)
    }

    /// Spend the same bcrypt work as [`verify_blocking`](Self::verify_blocking)
    /// when there is no stored hash to check against. Always a mismatch.
    pub async fn verify_unknown_blocking(&self, plaintext: String) -> bool {
        let hasher = *self;
        let _ = tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await;
        false
    }
}
