use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stallbook_core::DomainError;
use stallbook_inventory::LedgerError;
use stallbook_reporting::ExportError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Domain(e) => domain_error_to_response(e),
        LedgerError::Store(e) => {
            tracing::error!(error = %e, "record store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let code = err.code();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, code, err.to_string()),
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, code, err.to_string()),
        DomainError::CapacityExceeded { remaining, .. } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": code,
                "message": err.to_string(),
                "remaining": remaining,
            })),
        )
            .into_response(),
        DomainError::SessionClosed(_) => json_error(StatusCode::CONFLICT, code, err.to_string()),
    }
}

pub fn export_error_to_response(err: ExportError) -> axum::response::Response {
    tracing::error!(error = %err, "csv export failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_id() -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid food item id")
}
