//! Inventory domain module: the selling-session lifecycle.
//!
//! Records are mutated only through [`InventoryLedger`], which gates every
//! write on the derived [`SessionState`] and serialises writers behind a
//! single lock. Closing and resetting a session is delegated to the
//! [`ReconciliationEngine`].

pub mod ledger;
pub mod reconciliation;
pub mod record;
pub mod session;
pub mod store;

pub use ledger::{InventoryLedger, LedgerError, LedgerResult, ListOrder};
pub use reconciliation::ReconciliationEngine;
pub use record::{AddRecord, InventoryRecord};
pub use session::{SessionState, SessionStateMachine, SessionTransition};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
