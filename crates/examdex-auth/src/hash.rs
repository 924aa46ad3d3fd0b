//! Password hashing.
//!
//! The token engine never sees passwords; the authenticator checks them
//! through [`HashService`] before asking for tokens. [`Argon2HashService`]
//! is the default implementation:
//!
//! - Argon2id (hybrid mode) with default parameters
//! - Salts from OsRng
//! - PHC string format for storage
//!
//! Hashing is slow on purpose, so it runs on tokio's blocking pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

/// Errors from password hashing.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Hashing failed.
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// The stored hash is not a valid PHC string.
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),

    /// The blocking task was cancelled or panicked.
    #[error("Hashing task failed: {0}")]
    Task(String),
}

/// Hashes and verifies passwords.
#[async_trait]
pub trait HashService: Send + Sync {
    /// Hashes `password` for storage.
    async fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Checks `password` against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only if `hash` is unreadable.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError>;
}

/// Argon2id implementation of [`HashService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2HashService;

impl Argon2HashService {
    /// Creates the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HashService for Argon2HashService {
    async fn hash(&self, password: &str) -> Result<String, HashError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }
}

/// Hashes a password with Argon2id.
///
/// # Errors
///
/// Returns [`HashError::Hash`] if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::Hash(e.to_string()))
}

/// Verifies a password against a PHC-formatted Argon2 hash.
///
/// # Errors
///
/// Returns [`HashError::InvalidHash`] if `hash` cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(hash).map_err(|e| HashError::InvalidHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
