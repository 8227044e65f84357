//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: ledger wiring (record store, id generator, clock)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from process configuration (used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Result<Router, stallbook_inventory::StoreError> {
    let services = services::AppServices::from_config(config)?;
    Ok(build_app_with(services))
}

/// Build the router around already-wired services (tests inject a fixed clock).
pub fn build_app_with(services: services::AppServices) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
