//! Record store abstraction.
//!
//! The ledger talks to persistence only through [`RecordStore`]. Stores keep
//! records in insertion order and do their own internal locking; the ledger
//! adds the cross-call mutual exclusion on top.

use std::sync::{Arc, RwLock};

use thiserror::Error;

use stallbook_core::{Entity, RecordId};

use crate::record::InventoryRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("failed to (de)serialize records: {0}")]
    Serialization(String),

    #[error("stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("record {0} already exists")]
    Duplicate(RecordId),

    #[error("record {0} does not exist")]
    Missing(RecordId),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Key/value-like repository for the active period's records.
pub trait RecordStore: Send + Sync {
    /// All records, in insertion order.
    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError>;

    fn insert(&self, record: InventoryRecord) -> Result<(), StoreError>;

    /// Replace an existing record, keeping its position.
    fn update(&self, record: InventoryRecord) -> Result<(), StoreError>;

    /// Returns `false` if no record had that id.
    fn delete(&self, id: RecordId) -> Result<bool, StoreError>;

    /// Swap in a whole new record set as one commit (all-or-nothing).
    fn replace_all(&self, records: Vec<InventoryRecord>) -> Result<(), StoreError>;

    /// Remove every record; returns how many were discarded.
    fn clear(&self) -> Result<usize, StoreError>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).list()
    }

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get(id)
    }

    fn insert(&self, record: InventoryRecord) -> Result<(), StoreError> {
        (**self).insert(record)
    }

    fn update(&self, record: InventoryRecord) -> Result<(), StoreError> {
        (**self).update(record)
    }

    fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }

    fn replace_all(&self, records: Vec<InventoryRecord>) -> Result<(), StoreError> {
        (**self).replace_all(records)
    }

    fn clear(&self) -> Result<usize, StoreError> {
        (**self).clear()
    }
}

/// Apply an insert to an ordered entity vector (shared by store backends).
pub fn insert_into<E>(rows: &mut Vec<E>, record: E) -> Result<(), StoreError>
where
    E: Entity<Id = RecordId>,
{
    let id = Entity::id(&record);
    if rows.iter().any(|r| Entity::id(r) == id) {
        return Err(StoreError::Duplicate(id));
    }
    rows.push(record);
    Ok(())
}

/// Apply an in-place update to an ordered entity vector.
pub fn update_in<E>(rows: &mut [E], record: E) -> Result<(), StoreError>
where
    E: Entity<Id = RecordId>,
{
    let id = Entity::id(&record);
    match rows.iter_mut().find(|r| Entity::id(&**r) == id) {
        Some(slot) => {
            *slot = record;
            Ok(())
        }
        None => Err(StoreError::Missing(id)),
    }
}

/// In-memory record store for tests/dev and for processes without a data file.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    rows: RwLock<Vec<InventoryRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows.clone())
    }

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        let rows = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(rows.iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, record: InventoryRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        insert_into(&mut rows, record)
    }

    fn update(&self, record: InventoryRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        update_in(&mut rows, record)
    }

    fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        Ok(rows.len() != before)
    }

    fn replace_all(&self, records: Vec<InventoryRecord>) -> Result<(), StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        *rows = records;
        Ok(())
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let mut rows = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        let discarded = rows.len();
        rows.clear();
        Ok(discarded)
    }
}
