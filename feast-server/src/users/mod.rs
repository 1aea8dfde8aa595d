//! Accounts and credentials

pub mod password;
pub mod registry;

pub use password::{Argon2Hasher, PasswordHasher};
pub use registry::UserRegistry;
