//! Unified error handling for the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::OrderError;

/// Application-level error type for the order service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order workflow failure.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Order(err) => match err {
                OrderError::CustomerNotFound | OrderError::ProductNotFound => {
                    StatusCode::NOT_FOUND
                }
                OrderError::InvalidQuantity => StatusCode::BAD_REQUEST,
                OrderError::InsufficientQuantity => StatusCode::CONFLICT,
                OrderError::InvalidCard => StatusCode::PAYMENT_REQUIRED,
                OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Order service request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, message).into_response()
    }
}
