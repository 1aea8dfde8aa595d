//! UserRegistry - durable account records
//!
//! Every mutation runs inside one redb write transaction. redb admits a single
//! writer at a time, so a read-modify-write on one user can never interleave
//! with another writer, and creation (existence check + insert) is mutually
//! exclusive with concurrent creation or deletion.

use std::sync::Arc;

use redb::{ReadableTable, WriteTransaction};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Partition, Role, User};

use super::password::PasswordHasher;
use crate::db::{StorageError, StorageResult, Storage, USERS_TABLE};
use crate::orders::storage::partition_len_txn;

#[derive(Debug, Clone)]
pub struct UserRegistry {
    storage: Storage,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserRegistry {
    pub fn new(storage: Storage, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { storage, hasher }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // ========== Credentials ==========

    /// Hash a plaintext password with the configured hasher
    pub fn hash_password(&self, plaintext: &str) -> AppResult<String> {
        self.hasher.hash(plaintext)
    }

    /// Check a user's password
    pub fn verify_password(&self, user: &User, plaintext: &str) -> bool {
        self.hasher.verify(plaintext, &user.password_hash)
    }

    /// Resolve credentials to an account
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        match self.find(username)? {
            Some(user) if self.verify_password(&user, password) => Ok(user),
            _ => {
                tracing::warn!(target: "security", username = %username, "authentication failed");
                Err(AppError::invalid_credentials())
            }
        }
    }

    // ========== Queries ==========

    pub fn find(&self, username: &str) -> AppResult<Option<User>> {
        let txn = self.storage.begin_read()?;
        let table = txn.open_table(USERS_TABLE).map_err(StorageError::from)?;
        let user = match table.get(username).map_err(StorageError::from)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(user)
    }

    /// Like [`find`](Self::find) but absent users are an error
    pub fn get(&self, username: &str) -> AppResult<User> {
        self.find(username)?
            .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User not found: {username}")))
    }

    pub fn exists(&self, username: &str) -> AppResult<bool> {
        Ok(self.find(username)?.is_some())
    }

    /// All accounts, ordered by username
    pub fn list(&self) -> AppResult<Vec<User>> {
        let txn = self.storage.begin_read()?;
        let table = txn.open_table(USERS_TABLE).map_err(StorageError::from)?;
        let mut users = Vec::new();
        for entry in table.iter().map_err(StorageError::from)? {
            let (_key, value) = entry.map_err(StorageError::from)?;
            users.push(decode(value.value())?);
        }
        Ok(users)
    }

    // ========== Mutations ==========

    /// Insert a new account
    ///
    /// Fails with `UsernameTaken` when the username exists in any role, or
    /// `EmailTaken` when another customer already uses the email.
    pub fn create(&self, user: User) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        if load_user(&txn, &user.username)?.is_some() {
            return Err(AppError::with_message(
                ErrorCode::UsernameTaken,
                format!("Username already exists: {}", user.username),
            ));
        }
        if user.is_customer() {
            ensure_email_free(&txn, &user.email, &user.username)?;
        }
        store_user(&txn, &user)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(username = %user.username, role = %user.kind(), "account created");
        Ok(())
    }

    /// Overwrite an existing account record in place
    pub fn update(&self, user: &User) -> AppResult<()> {
        self.modify(&user.username, |current| {
            *current = user.clone();
            Ok(())
        })
        .map(|_| ())
    }

    /// Atomic read-modify-write of one account
    ///
    /// The closure may reject the change; nothing is written in that case.
    /// The username can not be changed through this path.
    pub fn modify<F>(&self, username: &str, f: F) -> AppResult<User>
    where
        F: FnOnce(&mut User) -> AppResult<()>,
    {
        let txn = self.storage.begin_write()?;
        let user = modify_user(&txn, username, f)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(user)
    }

    /// Remove an account
    ///
    /// A courier on a delivery and a restaurant with pending orders can not be
    /// removed. The pending check shares the write transaction with the
    /// removal, so a checkout can not slip an order in between.
    pub fn delete(&self, username: &str) -> AppResult<User> {
        let txn = self.storage.begin_write()?;
        let user = load_user(&txn, username)?
            .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User not found: {username}")))?;
        if let Role::Courier {
            active_delivery: Some(order_id),
            ..
        } = &user.role
        {
            return Err(AppError::with_message(
                ErrorCode::AccountInUse,
                format!("Courier is delivering order {order_id}"),
            ));
        }
        if user.is_restaurant() {
            let pending = partition_len_txn(&txn, &Partition::Restaurant(username.to_string()))?;
            if pending > 0 {
                return Err(AppError::with_message(
                    ErrorCode::AccountInUse,
                    format!("Restaurant has {pending} pending orders"),
                ));
            }
        }
        {
            let mut table = txn.open_table(USERS_TABLE).map_err(StorageError::from)?;
            table.remove(username).map_err(StorageError::from)?;
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(username = %username, "account deleted");
        Ok(user)
    }
}

// ========== Transaction helpers ==========
//
// Used by the order lifecycle so that order and account updates share one
// write transaction.

fn decode(bytes: &[u8]) -> StorageResult<User> {
    Ok(serde_json::from_slice(bytes)?)
}

pub(crate) fn load_user(txn: &WriteTransaction, username: &str) -> StorageResult<Option<User>> {
    let table = txn.open_table(USERS_TABLE)?;
    let user = match table.get(username)? {
        Some(value) => Some(decode(value.value())?),
        None => None,
    };
    Ok(user)
}

pub(crate) fn store_user(txn: &WriteTransaction, user: &User) -> StorageResult<()> {
    let mut table = txn.open_table(USERS_TABLE)?;
    let value = serde_json::to_vec(user)?;
    table.insert(user.username.as_str(), value.as_slice())?;
    Ok(())
}

pub(crate) fn modify_user<F>(txn: &WriteTransaction, username: &str, f: F) -> AppResult<User>
where
    F: FnOnce(&mut User) -> AppResult<()>,
{
    let mut user = load_user(txn, username)?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User not found: {username}")))?;
    let previous_email = user.email.clone();
    f(&mut user)?;
    if user.username != username {
        return Err(AppError::validation("username is immutable"));
    }
    if user.is_customer() && !user.email.eq_ignore_ascii_case(&previous_email) {
        ensure_email_free(txn, &user.email, username)?;
    }
    store_user(txn, &user)?;
    Ok(user)
}

fn ensure_email_free(txn: &WriteTransaction, email: &str, owner: &str) -> AppResult<()> {
    let table = txn.open_table(USERS_TABLE).map_err(StorageError::from)?;
    for entry in table.iter().map_err(StorageError::from)? {
        let (key, value) = entry.map_err(StorageError::from)?;
        if key.value() == owner {
            continue;
        }
        let other = decode(value.value())?;
        if other.is_customer() && other.email.eq_ignore_ascii_case(email) {
            return Err(AppError::with_message(
                ErrorCode::EmailTaken,
                format!("Email already registered: {email}"),
            ));
        }
    }
    Ok(())
}
