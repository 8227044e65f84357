//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity**; they are defined
//! entirely by their attribute values. `Money` is the one the inventory
//! domain needs.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Non-negative monetary amount in the smallest currency unit (e.g. cents).
///
/// Integer minor units keep sales totals exact; rendering with two decimals
/// happens only at the presentation edge.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl ValueObject for Money {}

impl Money {
    pub const ZERO: Money = Money(0);

    const MINOR_PER_MAJOR: u64 = 100;

    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Convert a major-unit amount (e.g. `5.25`) into minor units, rounding
    /// to the nearest cent.
    pub fn from_major(amount: f64) -> DomainResult<Self> {
        if !amount.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if amount < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        let minor = (amount * Self::MINOR_PER_MAJOR as f64).round();
        if minor > u64::MAX as f64 {
            return Err(DomainError::validation("price is too large"));
        }
        Ok(Self(minor as u64))
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Lossy major-unit view for JSON payloads and charts.
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / Self::MINOR_PER_MAJOR as f64
    }

    /// `self * quantity`, or `None` on overflow.
    pub fn checked_times(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(u64::from(quantity)).map(Money)
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / Self::MINOR_PER_MAJOR,
            self.0 % Self::MINOR_PER_MAJOR
        )
    }
}
