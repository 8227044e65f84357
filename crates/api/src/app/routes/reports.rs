use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stallbook_reporting::{LedgerReports, ReportFilter, detailed_csv, summary_csv};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/daily", get(daily_report))
        .route("/weekly", get(weekly_report))
        .route("/daily.csv", get(daily_csv))
        .route("/weekly.csv", get(weekly_csv))
}

fn daily_filter(services: &AppServices, query: &dto::ReportQuery) -> Result<ReportFilter, axum::response::Response> {
    match query.date.as_deref() {
        Some(raw) => Ok(ReportFilter::daily(dto::parse_date(raw)?)),
        None => Ok(ReportFilter::today(services.ledger.clock())),
    }
}

fn weekly_filter(services: &AppServices, query: &dto::ReportQuery) -> Result<ReportFilter, axum::response::Response> {
    match query.ending.as_deref() {
        Some(raw) => Ok(ReportFilter::weekly(dto::parse_date(raw)?)),
        None => Ok(ReportFilter::this_week(services.ledger.clock())),
    }
}

async fn json_report(services: &AppServices, filter: ReportFilter) -> axum::response::Response {
    match services.with_ledger(move |ledger| ledger.report(&filter)).await {
        Ok(result) => (StatusCode::OK, Json(dto::report_to_json(&filter, &result))).into_response(),
        Err(resp) => resp,
    }
}

async fn csv_report(services: &AppServices, filter: ReportFilter, detailed: bool) -> axum::response::Response {
    let result = match services.with_ledger(move |ledger| ledger.report(&filter)).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let body = if detailed {
        detailed_csv(&result)
    } else {
        summary_csv(&result)
    };
    let body = match body {
        Ok(b) => b,
        Err(e) => return errors::export_error_to_response(e),
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filter.export_file_name()),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn daily_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    match daily_filter(&services, &query) {
        Ok(filter) => json_report(&services, filter).await,
        Err(resp) => resp,
    }
}

pub async fn weekly_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    match weekly_filter(&services, &query) {
        Ok(filter) => json_report(&services, filter).await,
        Err(resp) => resp,
    }
}

pub async fn daily_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    match daily_filter(&services, &query) {
        Ok(filter) => csv_report(&services, filter, query.detailed).await,
        Err(resp) => resp,
    }
}

pub async fn weekly_csv(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    match weekly_filter(&services, &query) {
        Ok(filter) => csv_report(&services, filter, query.detailed).await,
        Err(resp) => resp,
    }
}
