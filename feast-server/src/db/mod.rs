//! redb-based storage layer
//!
//! One embedded database shared by the user registry and the order store, so
//! a lifecycle transition can update an order and the users it touches in a
//! single write transaction.
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `users` | `username` | `User` (JSON) | Account records |
//! | `orders` | `order_id` | `Order` (JSON) | Canonical order record |
//! | `partitions` | `(partition_key, order_id)` | `()` | Partition membership index |
//! | `order_partitions` | `(order_id, partition_key)` | `()` | Reverse index for reconciliation |
//! | `sequence` | `"order_id"` | `u64` | Order id allocator |
//!
//! # Durability
//!
//! redb commits are durable once `commit()` returns (copy-on-write with an
//! atomic root swap). A transaction dropped without commit is rolled back,
//! which is what makes every lifecycle transition all-or-nothing.

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::error::AppError;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Account records: key = username, value = JSON-serialized User
pub(crate) const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Canonical orders: key = order id, value = JSON-serialized Order
pub(crate) const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Membership index: key = (partition key, order id)
pub(crate) const PARTITIONS_TABLE: TableDefinition<(&str, u64), ()> =
    TableDefinition::new("partitions");

/// Reverse membership index: key = (order id, partition key)
pub(crate) const ORDER_PARTITIONS_TABLE: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("order_partitions");

/// Sequence counters: key = counter name, value = last issued value
pub(crate) const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence");

pub(crate) const ORDER_ID_KEY: &str = "order_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "storage failure");
        AppError::persistence(err.to_string())
    }
}

/// Shared handle to the embedded database
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and throwaway servers)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(PARTITIONS_TABLE)?;
            let _ = write_txn.open_table(ORDER_PARTITIONS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(ORDER_ID_KEY)?.is_none() {
                seq_table.insert(ORDER_ID_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    ///
    /// redb allows one writer at a time; concurrent callers queue here.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Begin a read transaction (snapshot isolation)
    pub fn begin_read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }
}
