use axum::{
    routing::{get, post},
    Router,
};

pub mod food_items;
pub mod reports;
pub mod session;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/food_items", food_items::router())
        .nest("/reports", reports::router())
        .route("/session", get(session::get_session))
        .route("/close_sales", post(session::close_sales))
        .route("/start_new_sales", post(session::start_new_sales))
}
