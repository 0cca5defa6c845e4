//! HTTP route handlers.

pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(orders::place_order))
        .route("/orders/top-by-value", get(orders::top5_by_value))
        .route("/orders/recent", get(orders::top5_recent))
        .route("/customers/{email}/orders", get(orders::orders_of_customer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
