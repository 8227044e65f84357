//! Close and reset transitions for the selling session.

use tracing::info;

use stallbook_core::DomainError;

use crate::ledger::LedgerResult;
use crate::record::InventoryRecord;
use crate::session::{SessionState, SessionTransition};
use crate::store::RecordStore;

/// Executes the session-level transitions against a record store.
///
/// The engine does no locking of its own; [`crate::InventoryLedger`] holds
/// the write lock for the duration of every call.
#[derive(Debug)]
pub struct ReconciliationEngine<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ReconciliationEngine<'a, S>
where
    S: RecordStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Reconcile every record and lock the session.
    ///
    /// The reconciled set is computed in full before anything is written and
    /// committed with a single `replace_all`, so a failure leaves the stored
    /// records untouched.
    pub fn close_sales(&self) -> LedgerResult<Vec<InventoryRecord>> {
        let records = self.store.list()?;
        let reconciled = Self::plan_close(&records)?;

        self.store.replace_all(reconciled.clone())?;

        let wasted: u64 = reconciled
            .iter()
            .map(|r| u64::from(r.quantity_wasted()))
            .sum();
        info!(records = reconciled.len(), wasted, "sales closed");
        Ok(reconciled)
    }

    /// Discard every record and reopen the session.
    pub fn start_new_sales(&self) -> LedgerResult<usize> {
        let records = self.store.list()?;
        SessionState::of(&records).transition(SessionTransition::Reset)?;

        let discarded = self.store.clear()?;
        info!(discarded, "new sales session started");
        Ok(discarded)
    }

    /// Pure part of `close_sales`: the record set as it will look once closed.
    pub fn plan_close(records: &[InventoryRecord]) -> Result<Vec<InventoryRecord>, DomainError> {
        SessionState::of(records).transition(SessionTransition::Close)?;
        if records.is_empty() {
            return Err(DomainError::validation(
                "cannot close sales with no items recorded",
            ));
        }

        records.iter().map(InventoryRecord::reconciled).collect()
    }
}
