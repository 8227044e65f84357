use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::dto;
use crate::app::services::AppServices;

pub async fn get_session(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let state = match services.with_ledger(|ledger| ledger.session_state()).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "state": state,
            "is_open": state.is_open(),
            "remainder_label": state.remainder_label(),
        })),
    )
        .into_response()
}

pub async fn close_sales(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.with_ledger(|ledger| ledger.close_sales()).await {
        Ok(records) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Sales closed. All unsold marked as wasted.",
                "records": dto::records_to_json(&records),
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

pub async fn start_new_sales(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.with_ledger(|ledger| ledger.start_new_sales()).await {
        Ok(discarded) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "New sales session started. All items cleared.",
                "discarded": discarded,
            })),
        )
            .into_response(),
        Err(resp) => resp,
    }
}
