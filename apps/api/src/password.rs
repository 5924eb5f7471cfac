//! Password hashing.
//!
//! Argon2id with a random salt per hash. Input over 72 bytes is rejected
//! outright rather than truncated.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use tableside_core::validation::{validate_password, MAX_PASSWORD_BYTES};
use tableside_core::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Length policy violated.
    #[error(transparent)]
    Policy(#[from] ValidationError),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

/// Hash a password for storage after checking the length policy.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash. Malformed hashes and
/// over-long input never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        return false;
    }

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
