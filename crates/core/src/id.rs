//! Strongly-typed record identifiers and their generators.

use core::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory record.
///
/// Ids are assigned once at creation and never reused, not even after a
/// reset discards every record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for RecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RecordId> for u64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl FromStr for RecordId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::validation(format!("RecordId: {e}")))?;
        Ok(Self(value))
    }
}

/// Source of fresh record ids.
///
/// Implementations must be monotonic: every call returns an id greater than
/// any id returned before.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Monotonic in-process id generator (starts at 1).
#[derive(Debug)]
pub struct SequentialIdGenerator {
    last: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Continue numbering after `last` (e.g. the high-water mark of a
    /// persisted store), so ids from a previous process are never reissued.
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RecordId {
        RecordId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl<G> IdGenerator for std::sync::Arc<G>
where
    G: IdGenerator + ?Sized,
{
    fn next_id(&self) -> RecordId {
        (**self).next_id()
    }
}
