use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use stallbook_core::Money;
use stallbook_inventory::{AddRecord, InventoryRecord, ListOrder};
use stallbook_reporting::{ReportFilter, ReportResult, ReportRow};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    pub time_slot: String,
    pub quantity_prepared: i64,
    /// Major currency units, e.g. `12.5`.
    pub price: f64,
}

impl CreateItemRequest {
    pub fn into_command(self) -> Result<AddRecord, axum::response::Response> {
        let date = self.date.as_deref().map(parse_date).transpose()?;
        let price = Money::from_major(self.price).map_err(errors::domain_error_to_response)?;
        Ok(AddRecord {
            name: self.name,
            date,
            time_slot: self.time_slot,
            quantity_prepared: self.quantity_prepared,
            price,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SellRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetSoldRequest {
    pub quantity_sold: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub order: Option<String>,
}

impl ListQuery {
    pub fn order(&self) -> Result<ListOrder, axum::response::Response> {
        match self.order.as_deref() {
            None | Some("inserted") => Ok(ListOrder::Inserted),
            Some("schedule") => Ok(ListOrder::Schedule),
            Some(other) => Err(errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_order",
                format!("order must be one of: inserted, schedule (got {other:?})"),
            )),
        }
    }
}

/// Query for the report endpoints. Daily reports read `date`, weekly ones
/// read `ending`; either defaults to today.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub date: Option<String>,
    pub ending: Option<String>,
    /// CSV only: include date, time slot and prepared columns.
    #[serde(default)]
    pub detailed: bool,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, axum::response::Response> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_date",
            format!("date must be YYYY-MM-DD (got {raw:?})"),
        )
    })
}

// -------------------------
// Response mapping
// -------------------------

pub fn record_to_json(record: &InventoryRecord) -> serde_json::Value {
    json!({
        "id": record.id().get(),
        "name": record.name(),
        "date": record.date().to_string(),
        "time_slot": record.time_slot(),
        "quantity_prepared": record.quantity_prepared(),
        "quantity_sold": record.quantity_sold(),
        "quantity_wasted": record.quantity_wasted(),
        "remaining": record.remaining(),
        "price": record.price().to_major(),
        "sales": record.sales().to_major(),
        "sales_closed": record.sales_closed(),
    })
}

pub fn records_to_json(records: &[InventoryRecord]) -> serde_json::Value {
    serde_json::Value::Array(records.iter().map(record_to_json).collect())
}

fn row_to_json(row: &ReportRow) -> serde_json::Value {
    json!({
        "id": row.id.get(),
        "name": row.name,
        "date": row.date.to_string(),
        "time_slot": row.time_slot,
        "prepared": row.prepared,
        "sold": row.sold,
        "remainder": row.remainder,
        "price": row.price.to_major(),
        "sales": row.sales.to_major(),
    })
}

pub fn report_to_json(filter: &ReportFilter, result: &ReportResult) -> serde_json::Value {
    let Some(report) = result.report() else {
        return json!({
            "title": filter.title(),
            "period": filter.label(),
            "empty": true,
            "message": "No data available for this period",
        });
    };

    let series = report.series();
    json!({
        "title": filter.title(),
        "period": filter.label(),
        "empty": false,
        "state": report.state,
        "remainder_label": report.remainder_label(),
        "total_sold": report.total_sold,
        "total_remainder": report.total_remainder,
        "total_sales": report.total_sales.to_major(),
        "rows": report.rows.iter().map(row_to_json).collect::<Vec<_>>(),
        "series": {
            "labels": series.labels,
            "sold": series.sold,
            "remainder": series.remainder,
            "sales": series.sales.iter().map(Money::to_major).collect::<Vec<_>>(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_maps_price_and_date() {
        let req = CreateItemRequest {
            name: "Dosa".to_string(),
            date: Some("2024-06-14".to_string()),
            time_slot: "Breakfast".to_string(),
            quantity_prepared: 20,
            price: 12.5,
        };
        let Ok(cmd) = req.into_command() else {
            panic!("valid request was rejected");
        };
        assert_eq!(cmd.price, Money::from_minor(1250));
        assert_eq!(cmd.date, NaiveDate::from_ymd_opt(2024, 6, 14));
    }

    #[test]
    fn bad_dates_and_prices_are_rejected() {
        assert!(parse_date("14/06/2024").is_err());

        let req = CreateItemRequest {
            name: "Dosa".to_string(),
            date: None,
            time_slot: "Breakfast".to_string(),
            quantity_prepared: 20,
            price: -1.0,
        };
        let res = req.into_command().unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn list_order_parsing() {
        assert!(matches!(ListQuery::default().order(), Ok(ListOrder::Inserted)));
        let q = ListQuery {
            order: Some("schedule".to_string()),
        };
        assert!(matches!(q.order(), Ok(ListOrder::Schedule)));
        let q = ListQuery {
            order: Some("price".to_string()),
        };
        assert!(q.order().is_err());
    }
}
