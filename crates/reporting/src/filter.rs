use chrono::{Days, NaiveDate};

use stallbook_core::{Clock, DomainError, DomainResult};
use stallbook_inventory::InventoryRecord;

/// Aggregation window over record dates.
///
/// Every comparison is between `NaiveDate`s (year-month-day), never between
/// instants, so a record can't slip into the neighbouring day through a
/// timezone conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    All,
    Daily { date: NaiveDate },
    /// The seven calendar days ending on `ending`, inclusive.
    Weekly { ending: NaiveDate },
    /// Inclusive on both ends.
    Range { from: NaiveDate, to: NaiveDate },
}

impl ReportFilter {
    const WEEK_SPAN_DAYS: u64 = 6;

    pub fn daily(date: NaiveDate) -> Self {
        ReportFilter::Daily { date }
    }

    pub fn weekly(ending: NaiveDate) -> Self {
        ReportFilter::Weekly { ending }
    }

    pub fn range(from: NaiveDate, to: NaiveDate) -> DomainResult<Self> {
        if from > to {
            return Err(DomainError::validation(format!(
                "report range starts ({from}) after it ends ({to})"
            )));
        }
        Ok(ReportFilter::Range { from, to })
    }

    pub fn today<C: Clock + ?Sized>(clock: &C) -> Self {
        Self::daily(clock.today())
    }

    pub fn this_week<C: Clock + ?Sized>(clock: &C) -> Self {
        Self::weekly(clock.today())
    }

    /// Inclusive `(first, last)` dates, or `None` for [`ReportFilter::All`].
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            ReportFilter::All => None,
            ReportFilter::Daily { date } => Some((date, date)),
            ReportFilter::Weekly { ending } => {
                let first = ending
                    .checked_sub_days(Days::new(Self::WEEK_SPAN_DAYS))
                    .unwrap_or(NaiveDate::MIN);
                Some((first, ending))
            }
            ReportFilter::Range { from, to } => Some((from, to)),
        }
    }

    pub fn matches(&self, record: &InventoryRecord) -> bool {
        match self.window() {
            None => true,
            Some((first, last)) => first <= record.date() && record.date() <= last,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportFilter::All => "All Records",
            ReportFilter::Daily { .. } => "Daily Report",
            ReportFilter::Weekly { .. } => "Weekly Analysis",
            ReportFilter::Range { .. } => "Period Report",
        }
    }

    /// Human-readable date label ("2024-06-14" or "2024-06-08 to 2024-06-14").
    pub fn label(&self) -> Option<String> {
        let (first, last) = self.window()?;
        if first == last {
            Some(first.to_string())
        } else {
            Some(format!("{first} to {last}"))
        }
    }

    /// Download name for an export, e.g. `daily_report_2024-06-14.csv`.
    pub fn export_file_name(&self) -> String {
        let stem = self.title().to_lowercase().replace(' ', "_");
        match self.window() {
            None => format!("{stem}.csv"),
            Some((first, last)) if first == last => format!("{stem}_{first}.csv"),
            Some((first, last)) => format!("{stem}_{first}_{last}.csv"),
        }
    }
}
