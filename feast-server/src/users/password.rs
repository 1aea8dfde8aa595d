//! Password hashing
//!
//! The registry only ever sees digests. Argon2id with a random salt per
//! password is the default; tests may inject something cheaper.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};

use crate::utils::{AppError, AppResult};

/// One-way password hash capability
pub trait PasswordHasher: Send + Sync + std::fmt::Debug {
    /// Hash a plaintext password into a self-describing digest
    fn hash(&self, plaintext: &str) -> AppResult<String>;

    /// Check a plaintext password against a stored digest
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id (default parameters)
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::internal(format!("password hash failed: {e}")))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "stored password digest is not a valid PHC string");
                false
            }
        }
    }
}
