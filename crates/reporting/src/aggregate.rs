use chrono::NaiveDate;

use stallbook_core::{Clock, IdGenerator, Money, RecordId};
use stallbook_inventory::{InventoryLedger, InventoryRecord, LedgerResult, RecordStore, SessionState};

use crate::filter::ReportFilter;

/// One record's line in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: RecordId,
    pub name: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub prepared: u32,
    pub sold: u32,
    /// Unsold units while open, wasted units once closed.
    pub remainder: u32,
    pub price: Money,
    pub sales: Money,
}

/// Column-oriented view of the rows, in row order (what chart widgets want).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportSeries {
    pub labels: Vec<String>,
    pub sold: Vec<u32>,
    pub remainder: Vec<u32>,
    pub sales: Vec<Money>,
}

/// Totals and rows for a non-empty selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub state: SessionState,
    pub total_sold: u64,
    pub total_remainder: u64,
    pub total_sales: Money,
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// "Unsold" or "Wasted", depending on the session state.
    pub fn remainder_label(&self) -> &'static str {
        self.state.remainder_label()
    }

    pub fn series(&self) -> ReportSeries {
        let mut series = ReportSeries::default();
        for row in &self.rows {
            series.labels.push(row.name.clone());
            series.sold.push(row.sold);
            series.remainder.push(row.remainder);
            series.sales.push(row.sales);
        }
        series
    }
}

/// Outcome of an aggregation. `Empty` is a normal result ("no data"), not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportResult {
    Empty,
    Report(Report),
}

impl ReportResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, ReportResult::Empty)
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            ReportResult::Empty => None,
            ReportResult::Report(r) => Some(r),
        }
    }
}

pub struct ReportAggregator;

impl ReportAggregator {
    /// Filter `records` and total what's left.
    ///
    /// Whether the remainder column means "unsold" or "wasted" is decided by
    /// the session state of the full record set, not of the filtered subset.
    pub fn aggregate<P>(records: &[InventoryRecord], predicate: P) -> ReportResult
    where
        P: Fn(&InventoryRecord) -> bool,
    {
        let state = SessionState::of(records);
        let rows: Vec<ReportRow> = records
            .iter()
            .filter(|r| predicate(r))
            .map(|r| Self::row(r, state))
            .collect();

        if rows.is_empty() {
            return ReportResult::Empty;
        }

        let total_sold = rows.iter().map(|r| u64::from(r.sold)).sum();
        let total_remainder = rows.iter().map(|r| u64::from(r.remainder)).sum();
        let total_sales = rows
            .iter()
            .fold(Money::ZERO, |acc, r| acc.saturating_add(r.sales));

        ReportResult::Report(Report {
            state,
            total_sold,
            total_remainder,
            total_sales,
            rows,
        })
    }

    pub fn aggregate_filter(records: &[InventoryRecord], filter: &ReportFilter) -> ReportResult {
        Self::aggregate(records, |r| filter.matches(r))
    }

    fn row(record: &InventoryRecord, state: SessionState) -> ReportRow {
        let remainder = match state {
            SessionState::Open => record.remaining(),
            SessionState::Closed => record.quantity_wasted(),
        };
        ReportRow {
            id: record.id(),
            name: record.name().to_string(),
            date: record.date(),
            time_slot: record.time_slot().to_string(),
            prepared: record.quantity_prepared(),
            sold: record.quantity_sold(),
            remainder,
            price: record.price(),
            sales: record.sales(),
        }
    }
}

/// Report queries run directly against a ledger snapshot.
pub trait LedgerReports {
    fn report(&self, filter: &ReportFilter) -> LedgerResult<ReportResult>;

    fn daily_report(&self) -> LedgerResult<ReportResult>;

    fn weekly_report(&self) -> LedgerResult<ReportResult>;
}

impl<S, I, C> LedgerReports for InventoryLedger<S, I, C>
where
    S: RecordStore,
    I: IdGenerator,
    C: Clock,
{
    fn report(&self, filter: &ReportFilter) -> LedgerResult<ReportResult> {
        self.snapshot(|records| ReportAggregator::aggregate_filter(records, filter))
    }

    fn daily_report(&self) -> LedgerResult<ReportResult> {
        self.report(&ReportFilter::today(self.clock()))
    }

    fn weekly_report(&self) -> LedgerResult<ReportResult> {
        self.report(&ReportFilter::this_week(self.clock()))
    }
}

#[cfg(test)]
mod tests {
    use stallbook_core::{FixedClock, SequentialIdGenerator};
    use stallbook_inventory::{AddRecord, InMemoryRecordStore};

    use super::*;

    type TestLedger = InventoryLedger<InMemoryRecordStore, SequentialIdGenerator, FixedClock>;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn ledger() -> TestLedger {
        InventoryLedger::new(
            InMemoryRecordStore::new(),
            SequentialIdGenerator::new(),
            FixedClock::new(today()),
        )
    }

    fn add(ledger: &TestLedger, name: &str, prepared: i64, price_minor: u64, date: Option<NaiveDate>) -> RecordId {
        ledger
            .add(AddRecord {
                name: name.to_string(),
                date,
                time_slot: "Lunch".to_string(),
                quantity_prepared: prepared,
                price: Money::from_minor(price_minor),
            })
            .unwrap()
    }

    #[test]
    fn empty_ledger_yields_empty_marker() {
        let ledger = ledger();
        assert_eq!(ledger.report(&ReportFilter::All).unwrap(), ReportResult::Empty);
        assert!(ledger.daily_report().unwrap().is_empty());
        assert!(ledger.weekly_report().unwrap().is_empty());
    }

    #[test]
    fn sold_out_item_totals_after_close() {
        let ledger = ledger();
        let a = add(&ledger, "A", 10, 500, None);
        ledger.sell(a, 3).unwrap();
        assert!(ledger.sell(a, 8).is_err());
        ledger.sell(a, 7).unwrap();
        ledger.close_sales().unwrap();

        let result = ledger.report(&ReportFilter::All).unwrap();
        let report = result.report().unwrap();
        assert_eq!(report.state, SessionState::Closed);
        assert_eq!(report.total_sold, 10);
        assert_eq!(report.total_remainder, 0);
        assert_eq!(report.total_sales.to_string(), "50.00");
    }

    #[test]
    fn unsold_item_becomes_waste_in_daily_report() {
        let ledger = ledger();
        add(&ledger, "B", 5, 200, None);
        ledger.close_sales().unwrap();

        let result = ledger.daily_report().unwrap();
        let report = result.report().unwrap();
        assert_eq!(report.remainder_label(), "Wasted");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].name, "B");
        assert_eq!(report.rows[0].remainder, 5);
        assert_eq!(report.rows[0].sold, 0);
        assert_eq!(report.rows[0].sales, Money::ZERO);
    }

    #[test]
    fn open_session_reports_unsold_remainder() {
        let ledger = ledger();
        let a = add(&ledger, "Tea", 30, 1000, None);
        let b = add(&ledger, "Coffee", 20, 1500, None);
        ledger.sell(a, 12).unwrap();
        ledger.sell(b, 20).unwrap();

        let result = ledger.report(&ReportFilter::All).unwrap();
        let report = result.report().unwrap();
        assert_eq!(report.remainder_label(), "Unsold");
        assert_eq!(report.total_sold, 32);
        assert_eq!(report.total_remainder, 18);
        assert_eq!(report.total_sales, Money::from_minor(12 * 1000 + 20 * 1500));

        let series = report.series();
        assert_eq!(series.labels, vec!["Tea", "Coffee"]);
        assert_eq!(series.sold, vec![12, 20]);
        assert_eq!(series.remainder, vec![18, 0]);
    }

    #[test]
    fn filters_select_by_calendar_date_and_keep_order() {
        let ledger = ledger();
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day);
        add(&ledger, "today-1", 1, 100, None);
        add(&ledger, "week-start", 1, 100, d(8));
        add(&ledger, "too-old", 1, 100, d(7));
        add(&ledger, "today-2", 1, 100, d(14));

        let names = |result: ReportResult| -> Vec<String> {
            result
                .report()
                .map(|r| r.rows.iter().map(|row| row.name.clone()).collect())
                .unwrap_or_default()
        };

        assert_eq!(names(ledger.daily_report().unwrap()), vec!["today-1", "today-2"]);
        assert_eq!(
            names(ledger.weekly_report().unwrap()),
            vec!["today-1", "week-start", "today-2"]
        );
        assert!(
            ledger
                .report(&ReportFilter::daily(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn custom_predicate() {
        let ledger = ledger();
        add(&ledger, "Idli", 4, 100, None);
        add(&ledger, "Vada", 4, 100, None);

        let result = ledger
            .snapshot(|records| ReportAggregator::aggregate(records, |r| r.name() == "Vada"))
            .unwrap();
        assert_eq!(result.report().unwrap().rows.len(), 1);
    }

    #[test]
    fn reports_taken_during_close_are_all_unsold_or_all_wasted() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let ledger = Arc::new(ledger());
        for i in 0..30 {
            let id = add(&ledger, &format!("Item {i}"), 6, 250, None);
            ledger.sell(id, 2).unwrap();
        }
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let ledger = Arc::clone(&ledger);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                let mut seen = Vec::new();
                while !done.load(Ordering::Acquire) || seen.is_empty() {
                    let result = ledger.report(&ReportFilter::All).unwrap();
                    let report = result.report().unwrap();
                    assert_eq!(report.total_sold, 60);
                    assert_eq!(report.total_remainder, 120);
                    seen.push(report.state);
                }
                seen
            })
        };

        ledger.close_sales().unwrap();
        done.store(true, Ordering::Release);

        let states = reader.join().unwrap();
        assert!(!states.is_empty());
        // once a closed report is observed, no later report may be open again
        if let Some(first_closed) = states.iter().position(|s| *s == SessionState::Closed) {
            assert!(states[first_closed..].iter().all(|s| *s == SessionState::Closed));
        }
        assert_eq!(
            ledger.report(&ReportFilter::All).unwrap().report().unwrap().state,
            SessionState::Closed
        );
    }
}
