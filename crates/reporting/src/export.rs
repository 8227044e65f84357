//! CSV export of report results.
//!
//! Quantities are written as integers; prices and sales as two-decimal
//! amounts.

use thiserror::Error;

use crate::aggregate::ReportResult;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub const SUMMARY_HEADER: [&str; 5] = ["Name", "Sold", "Wasted/Unsold", "Price", "Sales"];

pub const DETAILED_HEADER: [&str; 8] = [
    "Name",
    "Date",
    "Time Slot",
    "Prepared",
    "Sold",
    "Wasted",
    "Price",
    "Sales",
];

/// One line per record: `Name,Sold,Wasted/Unsold,Price,Sales`.
///
/// An empty result still yields the header line.
pub fn summary_csv(result: &ReportResult) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SUMMARY_HEADER)?;

    if let Some(report) = result.report() {
        for row in &report.rows {
            writer.write_record([
                row.name.clone(),
                row.sold.to_string(),
                row.remainder.to_string(),
                row.price.to_string(),
                row.sales.to_string(),
            ])?;
        }
    }

    finish(writer)
}

/// Full per-record export including date, time slot and prepared quantity.
pub fn detailed_csv(result: &ReportResult) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(DETAILED_HEADER)?;

    if let Some(report) = result.report() {
        for row in &report.rows {
            writer.write_record([
                row.name.clone(),
                row.date.to_string(),
                row.time_slot.clone(),
                row.prepared.to_string(),
                row.sold.to_string(),
                row.remainder.to_string(),
                row.price.to_string(),
                row.sales.to_string(),
            ])?;
        }
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
