//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use estore_core::{Email, OrderId};

use crate::error::AppError;
use crate::services::orders::{OrderConfirmation, PlaceOrderRequest};
use crate::state::AppState;

/// `POST /orders` - place an order for a single product.
#[instrument(skip(state, request), fields(product = %request.product_id))]
pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderConfirmation>), AppError> {
    let confirmation = state.orders().place_order(&request).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// `GET /orders/top-by-value` - the five orders with the highest total.
pub async fn top5_by_value(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderId>>, AppError> {
    Ok(Json(state.orders().top5_by_value().await?))
}

/// `GET /orders/recent` - the five most recently placed orders.
pub async fn top5_recent(State(state): State<AppState>) -> Result<Json<Vec<OrderId>>, AppError> {
    Ok(Json(state.orders().top5_recent().await?))
}

/// `GET /customers/{email}/orders` - every order id for one customer.
pub async fn orders_of_customer(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<OrderId>>, AppError> {
    let email =
        Email::parse(&email).map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    Ok(Json(state.orders().orders_of_customer(&email).await?))
}
