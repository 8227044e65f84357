use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stallbook_core::RecordId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(set_sold).delete(delete_item))
        .route("/:id/sell", post(sell_item))
}

fn parse_id(raw: &str) -> Result<RecordId, axum::response::Response> {
    raw.parse().map_err(|_| errors::invalid_id())
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let order = match query.order() {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    match services.with_ledger(move |ledger| ledger.list_ordered(order)).await {
        Ok(records) => (StatusCode::OK, Json(dto::records_to_json(&records))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let created = services
        .with_ledger(move |ledger| ledger.add(cmd).and_then(|id| ledger.get(id)))
        .await;
    let record = match created {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    (StatusCode::CREATED, Json(dto::record_to_json(&record))).into_response()
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.with_ledger(move |ledger| ledger.get(id)).await {
        Ok(record) => (StatusCode::OK, Json(dto::record_to_json(&record))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn sell_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SellRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let quantity = body.quantity;
    match services.with_ledger(move |ledger| ledger.sell(id, quantity)).await {
        Ok(record) => (StatusCode::OK, Json(dto::record_to_json(&record))).into_response(),
        Err(resp) => resp,
    }
}

/// Absolute overwrite of `quantity_sold`; only mounted when enabled in config.
pub async fn set_sold(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetSoldRequest>,
) -> axum::response::Response {
    if !services.allow_set_sold {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "set_sold_disabled",
            "overwriting quantity_sold is disabled; use POST /api/food_items/:id/sell",
        );
    }

    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let quantity_sold = body.quantity_sold;
    match services.with_ledger(move |ledger| ledger.set_sold(id, quantity_sold)).await {
        Ok(record) => (StatusCode::OK, Json(dto::record_to_json(&record))).into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.with_ledger(move |ledger| ledger.delete(id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
