use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stallbook_core::{DomainError, DomainResult, Entity, Money, RecordId};

/// Command: add a prepared item to the current selling session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRecord {
    pub name: String,
    /// Calendar date the batch belongs to; `None` means "today".
    pub date: Option<NaiveDate>,
    pub time_slot: String,
    pub quantity_prepared: i64,
    pub price: Money,
}

/// One prepared batch of a menu item and what became of it.
///
/// Fields are private: the only way to change a record is through the
/// transition methods below, each of which returns a new value and leaves
/// `self` untouched on error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    id: RecordId,
    name: String,
    date: NaiveDate,
    time_slot: String,
    quantity_prepared: u32,
    quantity_sold: u32,
    quantity_wasted: u32,
    price: Money,
    sales_closed: bool,
}

impl InventoryRecord {
    /// Validate an [`AddRecord`] command and build a fresh, open record.
    pub fn create(id: RecordId, date: NaiveDate, cmd: AddRecord) -> DomainResult<Self> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.quantity_prepared < 0 {
            return Err(DomainError::validation(
                "quantity_prepared cannot be negative",
            ));
        }
        let quantity_prepared = u32::try_from(cmd.quantity_prepared)
            .map_err(|_| DomainError::validation("quantity_prepared is too large"))?;
        if cmd.price.checked_times(quantity_prepared).is_none() {
            return Err(DomainError::validation("price is too large"));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            date,
            time_slot: cmd.time_slot,
            quantity_prepared,
            quantity_sold: 0,
            quantity_wasted: 0,
            price: cmd.price,
            sales_closed: false,
        })
    }

    pub(crate) fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time_slot(&self) -> &str {
        &self.time_slot
    }

    pub fn quantity_prepared(&self) -> u32 {
        self.quantity_prepared
    }

    pub fn quantity_sold(&self) -> u32 {
        self.quantity_sold
    }

    /// Persisted waste figure: zero until the session is closed.
    pub fn quantity_wasted(&self) -> u32 {
        self.quantity_wasted
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn sales_closed(&self) -> bool {
        self.sales_closed
    }

    /// Units still available to sell.
    pub fn remaining(&self) -> u32 {
        self.quantity_prepared - self.quantity_sold
    }

    /// "Unsold" while the session is open, "wasted" once it is closed.
    pub fn remainder(&self) -> u32 {
        if self.sales_closed {
            self.quantity_wasted
        } else {
            self.remaining()
        }
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining() == 0
    }

    /// Revenue for this record (`sold * price`).
    pub fn sales(&self) -> Money {
        // Bounded by `prepared * price`, which `create` checked.
        self.price
            .checked_times(self.quantity_sold)
            .unwrap_or(Money::from_minor(u64::MAX))
    }

    /// Record `delta` more units sold.
    pub fn with_sale(&self, delta: i64) -> DomainResult<Self> {
        self.ensure_not_closed()?;
        if delta <= 0 {
            return Err(DomainError::validation("quantity to sell must be positive"));
        }
        let requested = delta as u64;
        let remaining = self.remaining();
        if requested > u64::from(remaining) {
            return Err(DomainError::capacity_exceeded(requested, remaining));
        }

        let mut next = self.clone();
        next.quantity_sold += requested as u32;
        Ok(next)
    }

    /// Overwrite the sold total. May lower it; see `InventoryLedger::set_sold`.
    pub fn with_sold(&self, new_sold: i64) -> DomainResult<Self> {
        self.ensure_not_closed()?;
        if new_sold < 0 || new_sold > i64::from(self.quantity_prepared) {
            return Err(DomainError::validation(format!(
                "quantity_sold must be between 0 and {}",
                self.quantity_prepared
            )));
        }

        let mut next = self.clone();
        next.quantity_sold = new_sold as u32;
        Ok(next)
    }

    /// Freeze the record and turn its unsold remainder into waste.
    pub fn reconciled(&self) -> DomainResult<Self> {
        self.ensure_not_closed()?;
        let mut next = self.clone();
        next.quantity_wasted = self.remaining();
        next.sales_closed = true;
        next.check_invariants()?;
        Ok(next)
    }

    /// Quantity invariants that must hold for any stored record.
    ///
    /// Used on reconciliation and when loading records from external storage.
    pub fn check_invariants(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "record {}: name cannot be empty",
                self.id
            )));
        }
        if self.quantity_sold > self.quantity_prepared {
            return Err(DomainError::validation(format!(
                "record {}: sold {} exceeds prepared {}",
                self.id, self.quantity_sold, self.quantity_prepared
            )));
        }
        if self.sales_closed {
            if self.quantity_sold + self.quantity_wasted != self.quantity_prepared {
                return Err(DomainError::validation(format!(
                    "record {}: sold + wasted does not equal prepared",
                    self.id
                )));
            }
        } else if self.quantity_wasted != 0 {
            return Err(DomainError::validation(format!(
                "record {}: waste recorded before close",
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_not_closed(&self) -> DomainResult<()> {
        if self.sales_closed {
            return Err(DomainError::session_closed(format!(
                "record {} is locked",
                self.id
            )));
        }
        Ok(())
    }
}

impl Entity for InventoryRecord {
    type Id = RecordId;

    fn id(&self) -> RecordId {
        self.id
    }
}
