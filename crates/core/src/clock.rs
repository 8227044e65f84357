//! Clock abstraction (injectable for deterministic tests).

use std::sync::RwLock;

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
///
/// Records and report windows are keyed by timezone-naive calendar dates, so
/// the clock hands out a `NaiveDate` rather than an instant.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the process's local timezone.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a date; can be moved forward or back by tests.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        if let Ok(mut guard) = self.today.write() {
            *guard = today;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl<C> Clock for std::sync::Arc<C>
where
    C: Clock + ?Sized,
{
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
