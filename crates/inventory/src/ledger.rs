//! Inventory ledger: the single entry point for reading and mutating records.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::{debug, info, warn};

use stallbook_core::{Clock, DomainError, IdGenerator, RecordId};

use crate::reconciliation::ReconciliationEngine;
use crate::record::{AddRecord, InventoryRecord};
use crate::session::{SessionState, SessionStateMachine};
use crate::store::{RecordStore, StoreError};

/// Errors surfaced by ledger operations.
///
/// Domain errors are the caller's fault; store errors are infrastructure
/// failures and are passed through unchanged.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ordering for [`InventoryLedger::list_ordered`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Creation order.
    #[default]
    Inserted,
    /// Newest date first, then time slot alphabetically.
    Schedule,
}

/// Owns the active period's records and enforces the session rules.
///
/// Writers are serialised by `gate`; readers share it, so a reader never
/// observes a close or reset halfway through.
pub struct InventoryLedger<S, I, C> {
    store: S,
    ids: I,
    clock: C,
    gate: RwLock<()>,
}

impl<S, I, C> InventoryLedger<S, I, C>
where
    S: RecordStore,
    I: IdGenerator,
    C: Clock,
{
    pub fn new(store: S, ids: I, clock: C) -> Self {
        Self {
            store,
            ids,
            clock,
            gate: RwLock::new(()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn read_gate(&self) -> LedgerResult<RwLockReadGuard<'_, ()>> {
        self.gate.read().map_err(|_| StoreError::LockPoisoned.into())
    }

    fn write_gate(&self) -> LedgerResult<RwLockWriteGuard<'_, ()>> {
        self.gate.write().map_err(|_| StoreError::LockPoisoned.into())
    }

    /// All records in creation order. Available in any session state.
    pub fn list(&self) -> LedgerResult<Vec<InventoryRecord>> {
        let _read = self.read_gate()?;
        Ok(self.store.list()?)
    }

    pub fn list_ordered(&self, order: ListOrder) -> LedgerResult<Vec<InventoryRecord>> {
        let mut records = self.list()?;
        if order == ListOrder::Schedule {
            // Stable sort: ties keep creation order.
            records.sort_by(|a, b| {
                b.date()
                    .cmp(&a.date())
                    .then_with(|| a.time_slot().cmp(b.time_slot()))
            });
        }
        Ok(records)
    }

    pub fn get(&self, id: RecordId) -> LedgerResult<InventoryRecord> {
        let _read = self.read_gate()?;
        self.store
            .get(id)?
            .ok_or_else(|| DomainError::not_found(id).into())
    }

    /// Run `f` over a consistent snapshot of the record set.
    pub fn snapshot<T>(&self, f: impl FnOnce(&[InventoryRecord]) -> T) -> LedgerResult<T> {
        let _read = self.read_gate()?;
        let records = self.store.list()?;
        Ok(f(&records))
    }

    pub fn session_state(&self) -> LedgerResult<SessionState> {
        self.snapshot(SessionState::of)
    }

    pub fn is_open(&self) -> LedgerResult<bool> {
        Ok(self.session_state()?.is_open())
    }

    /// Add a prepared item; returns the new record id.
    pub fn add(&self, cmd: AddRecord) -> LedgerResult<RecordId> {
        let _write = self.write_gate()?;
        self.assert_open("add items")?;

        let date = cmd.date.unwrap_or_else(|| self.clock.today());
        // Validate before drawing an id so rejected input does not burn one.
        let draft = InventoryRecord::create(RecordId::new(0), date, cmd).map_err(|e| {
            debug!(error = %e, "add rejected");
            e
        })?;
        let id = self.ids.next_id();
        let record = draft.with_id(id);

        info!(
            record_id = %id,
            name = record.name(),
            date = %record.date(),
            prepared = record.quantity_prepared(),
            price = %record.price(),
            "record added"
        );
        self.store.insert(record)?;
        Ok(id)
    }

    /// Record `delta` more units sold.
    pub fn sell(&self, id: RecordId, delta: i64) -> LedgerResult<InventoryRecord> {
        let _write = self.write_gate()?;
        self.assert_open("sell")?;
        if delta <= 0 {
            debug!(record_id = %id, delta, "sale rejected: non-positive quantity");
            return Err(DomainError::validation("quantity to sell must be positive").into());
        }

        let current = self.require(id)?;
        let updated = current.with_sale(delta).map_err(|e| {
            debug!(record_id = %id, delta, error = %e, "sale rejected");
            e
        })?;
        self.store.update(updated.clone())?;

        info!(
            record_id = %id,
            delta,
            sold = updated.quantity_sold(),
            remaining = updated.remaining(),
            "sale recorded"
        );
        Ok(updated)
    }

    /// Overwrite the sold total.
    ///
    /// Unlike [`Self::sell`] this can lower `quantity_sold`, and a caller
    /// working from a stale read will silently erase sales recorded in the
    /// meantime. Every overwrite is logged with the value it replaced.
    pub fn set_sold(&self, id: RecordId, new_sold: i64) -> LedgerResult<InventoryRecord> {
        let _write = self.write_gate()?;
        self.assert_open("update sold quantity")?;

        let current = self.require(id)?;
        let updated = current.with_sold(new_sold)?;
        self.store.update(updated.clone())?;

        warn!(
            record_id = %id,
            previous = current.quantity_sold(),
            sold = updated.quantity_sold(),
            "sold quantity overwritten"
        );
        Ok(updated)
    }

    pub fn delete(&self, id: RecordId) -> LedgerResult<()> {
        let _write = self.write_gate()?;
        self.assert_open("delete items")?;

        if !self.store.delete(id)? {
            return Err(DomainError::not_found(id).into());
        }
        info!(record_id = %id, "record deleted");
        Ok(())
    }

    /// Close the session: remainder becomes waste and every record locks.
    pub fn close_sales(&self) -> LedgerResult<Vec<InventoryRecord>> {
        let _write = self.write_gate()?;
        ReconciliationEngine::new(&self.store).close_sales()
    }

    /// Discard all records and reopen. Returns the number discarded.
    pub fn start_new_sales(&self) -> LedgerResult<usize> {
        let _write = self.write_gate()?;
        ReconciliationEngine::new(&self.store).start_new_sales()
    }

    // Callers must already hold the gate.
    fn assert_open(&self, action: &str) -> LedgerResult<()> {
        let records = self.store.list()?;
        SessionStateMachine::over(&records)
            .assert_open(action)
            .map_err(|e| {
                debug!(action, "rejected: session closed");
                e.into()
            })
    }

    fn require(&self, id: RecordId) -> LedgerResult<InventoryRecord> {
        self.store
            .get(id)?
            .ok_or_else(|| DomainError::not_found(id).into())
    }
}
