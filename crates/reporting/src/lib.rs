//! Period reports over inventory records.
//!
//! Pure read-side code: filters select records by calendar date, the
//! aggregator totals them, and `export` renders the result as CSV.

pub mod aggregate;
pub mod export;
pub mod filter;

pub use aggregate::{LedgerReports, Report, ReportAggregator, ReportResult, ReportRow, ReportSeries};
pub use export::{ExportError, detailed_csv, summary_csv};
pub use filter::ReportFilter;
