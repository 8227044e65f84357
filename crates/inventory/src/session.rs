//! Selling-session state machine.
//!
//! The session state is never stored; it is derived from the record set on
//! every read, so it cannot drift from the records it describes.

use serde::{Deserialize, Serialize};

use stallbook_core::{DomainError, DomainResult};

use crate::record::InventoryRecord;

/// Session lifecycle: `Open -> Closed` via close, `* -> Open` via reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Open,
    Closed,
}

/// Transitions accepted by [`SessionState::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    /// Reconcile the period: remainder becomes waste, records lock.
    Close,
    /// Discard every record and reopen.
    Reset,
}

impl SessionState {
    /// Derive the state of a record set.
    ///
    /// Closed iff the set is non-empty and every record is closed.
    pub fn of(records: &[InventoryRecord]) -> Self {
        if !records.is_empty() && records.iter().all(InventoryRecord::sales_closed) {
            SessionState::Closed
        } else {
            SessionState::Open
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, SessionState::Open)
    }

    pub fn transition(self, transition: SessionTransition) -> DomainResult<SessionState> {
        match (self, transition) {
            (SessionState::Open, SessionTransition::Close) => Ok(SessionState::Closed),
            (SessionState::Closed, SessionTransition::Close) => Err(DomainError::session_closed(
                "sales are already closed; start a new session first",
            )),
            (_, SessionTransition::Reset) => Ok(SessionState::Open),
        }
    }

    /// Column label for `prepared - sold` in this state.
    pub fn remainder_label(self) -> &'static str {
        match self {
            SessionState::Open => "Unsold",
            SessionState::Closed => "Wasted",
        }
    }
}

impl core::fmt::Display for SessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionState::Open => f.write_str("open"),
            SessionState::Closed => f.write_str("closed"),
        }
    }
}

/// Gate over a record set; every mutating ledger operation asks it first.
#[derive(Debug, Clone, Copy)]
pub struct SessionStateMachine<'a> {
    records: &'a [InventoryRecord],
}

impl<'a> SessionStateMachine<'a> {
    pub fn over(records: &'a [InventoryRecord]) -> Self {
        Self { records }
    }

    pub fn state(&self) -> SessionState {
        SessionState::of(self.records)
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Fail with `SessionClosed` unless the session is open.
    pub fn assert_open(&self, action: &str) -> DomainResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DomainError::session_closed(format!(
                "cannot {action} after sales are closed"
            )))
        }
    }
}
