//! OrderStore - status-partitioned order persistence
//!
//! One canonical record per order plus a membership index per partition:
//!
//! ```text
//!   orders            partitions                    order_partitions
//!   ┌────┬───────┐    ┌──────────────────┬────┐    ┌────┬──────────────────┐
//!   │ 7  │ {...} │    │ customer:alice   │ 7  │    │ 7  │ customer:alice   │
//!   └────┴───────┘    │ restaurant:bob   │ 7  │    │ 7  │ restaurant:bob   │
//!                     └──────────────────┴────┘    └────┴──────────────────┘
//! ```
//!
//! [`record_transition`](OrderStore::record_transition) rewrites the canonical
//! record and reconciles membership against [`Partition::for_order`] in the
//! same write transaction. Replaying it is a no-op.

use std::collections::BTreeSet;

use redb::{ReadableTable, WriteTransaction};
use shared::error::{AppError, AppResult};
use shared::models::{Order, Partition};

use crate::db::{
    ORDER_ID_KEY, ORDER_PARTITIONS_TABLE, ORDERS_TABLE, PARTITIONS_TABLE, SEQUENCE_TABLE, Storage,
    StorageError, StorageResult,
};

#[derive(Debug, Clone)]
pub struct OrderStore {
    storage: Storage,
}

impl OrderStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Persist the order and make its partition membership match its status
    pub fn record_transition(&self, order: &Order) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        record_transition_txn(&txn, order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    pub fn find_by_id(&self, order_id: u64) -> AppResult<Option<Order>> {
        let txn = self.storage.begin_read()?;
        let table = txn.open_table(ORDERS_TABLE).map_err(StorageError::from)?;
        let order = match table.get(order_id).map_err(StorageError::from)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(order)
    }

    /// Like [`find_by_id`](Self::find_by_id) but absent orders are an error
    pub fn get(&self, order_id: u64) -> AppResult<Order> {
        self.find_by_id(order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))
    }

    /// Every order currently recorded under the partition, by ascending id
    pub fn list_by_partition(&self, partition: &Partition) -> AppResult<Vec<Order>> {
        let key = partition.key();
        let txn = self.storage.begin_read()?;
        let index = txn.open_table(PARTITIONS_TABLE).map_err(StorageError::from)?;
        let orders = txn.open_table(ORDERS_TABLE).map_err(StorageError::from)?;

        let mut result = Vec::new();
        for entry in index
            .range((key.as_str(), 0u64)..=(key.as_str(), u64::MAX))
            .map_err(StorageError::from)?
        {
            let (k, _) = entry.map_err(StorageError::from)?;
            let (_, order_id) = k.value();
            let value = orders
                .get(order_id)
                .map_err(StorageError::from)?
                .ok_or_else(|| StorageError::Corrupt(format!("{key} lists missing order {order_id}")))?;
            result.push(decode(value.value())?);
        }
        Ok(result)
    }

    /// Whether the partition currently holds the order
    pub fn contains(&self, partition: &Partition, order_id: u64) -> AppResult<bool> {
        let key = partition.key();
        let txn = self.storage.begin_read()?;
        let index = txn.open_table(PARTITIONS_TABLE).map_err(StorageError::from)?;
        Ok(index
            .get((key.as_str(), order_id))
            .map_err(StorageError::from)?
            .is_some())
    }

    /// Partitions the order is currently recorded under
    pub fn partitions_of(&self, order_id: u64) -> AppResult<Vec<Partition>> {
        let txn = self.storage.begin_read()?;
        let reverse = txn
            .open_table(ORDER_PARTITIONS_TABLE)
            .map_err(StorageError::from)?;
        let mut partitions = Vec::new();
        for entry in reverse.range((order_id, "")..).map_err(StorageError::from)? {
            let (k, _) = entry.map_err(StorageError::from)?;
            let (id, key) = k.value();
            if id != order_id {
                break;
            }
            let partition = key
                .parse::<Partition>()
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            partitions.push(partition);
        }
        partitions.sort();
        Ok(partitions)
    }
}

// ========== Transaction helpers ==========

fn decode(bytes: &[u8]) -> StorageResult<Order> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Allocate the next order id (strictly increasing, never reused)
///
/// The increment commits or rolls back together with the caller's
/// transaction, so a failed checkout does not burn an id.
pub(crate) fn next_order_id(txn: &WriteTransaction) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCE_TABLE)?;
    let current = table
        .get(ORDER_ID_KEY)?
        .map(|guard| guard.value())
        .unwrap_or(0);
    let next = current + 1;
    table.insert(ORDER_ID_KEY, next)?;
    Ok(next)
}

pub(crate) fn load_order(txn: &WriteTransaction, order_id: u64) -> StorageResult<Option<Order>> {
    let table = txn.open_table(ORDERS_TABLE)?;
    let order = match table.get(order_id)? {
        Some(value) => Some(decode(value.value())?),
        None => None,
    };
    Ok(order)
}

pub(crate) fn contains_txn(
    txn: &WriteTransaction,
    partition: &Partition,
    order_id: u64,
) -> StorageResult<bool> {
    let key = partition.key();
    let index = txn.open_table(PARTITIONS_TABLE)?;
    Ok(index.get((key.as_str(), order_id))?.is_some())
}

/// Number of orders the partition currently holds
pub(crate) fn partition_len_txn(txn: &WriteTransaction, partition: &Partition) -> StorageResult<usize> {
    let key = partition.key();
    let index = txn.open_table(PARTITIONS_TABLE)?;
    let mut count = 0;
    for entry in index.range((key.as_str(), 0u64)..=(key.as_str(), u64::MAX))? {
        entry?;
        count += 1;
    }
    Ok(count)
}

/// Write the canonical record and reconcile partition membership
pub(crate) fn record_transition_txn(txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
    {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id, value.as_slice())?;
    }

    let desired: BTreeSet<String> = Partition::for_order(order)
        .iter()
        .map(Partition::key)
        .collect();

    let mut index = txn.open_table(PARTITIONS_TABLE)?;
    let mut reverse = txn.open_table(ORDER_PARTITIONS_TABLE)?;

    let mut current = BTreeSet::new();
    for entry in reverse.range((order.id, "")..)? {
        let (k, _) = entry?;
        let (id, key) = k.value();
        if id != order.id {
            break;
        }
        current.insert(key.to_string());
    }

    for stale in current.difference(&desired) {
        index.remove((stale.as_str(), order.id))?;
        reverse.remove((order.id, stale.as_str()))?;
    }
    for missing in desired.difference(&current) {
        index.insert((missing.as_str(), order.id), ())?;
        reverse.insert((order.id, missing.as_str()), ())?;
    }
    Ok(())
}
