//! Domain error model.

use thiserror::Error;

use crate::id::RecordId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, caller-caused failures (bad input,
/// unknown ids, session gating). Persistence failures belong to the store
/// layer and are wrapped separately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (malformed or out-of-range input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record exists with the given id.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// A sale would push `quantity_sold` past `quantity_prepared`.
    #[error("cannot sell {requested} units: only {remaining} remaining")]
    CapacityExceeded { requested: u64, remaining: u32 },

    /// A mutation was attempted while the selling session is closed.
    #[error("sales session is closed: {0}")]
    SessionClosed(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(id: RecordId) -> Self {
        Self::NotFound(id)
    }

    pub fn capacity_exceeded(requested: u64, remaining: u32) -> Self {
        Self::CapacityExceeded {
            requested,
            remaining,
        }
    }

    pub fn session_closed(msg: impl Into<String>) -> Self {
        Self::SessionClosed(msg.into())
    }

    /// Stable machine-readable code, used by the HTTP layer and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::SessionClosed(_) => "session_closed",
        }
    }
}
