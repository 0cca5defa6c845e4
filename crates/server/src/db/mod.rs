//! Database operations for the order service (`PostgreSQL`).
//!
//! ## Tables
//!
//! - `customer` - Registered customers (unique email)
//! - `product` - Catalog products with live inventory
//! - `card` - Stored payment cards, keyed by card number
//! - `order_info` - Placed orders
//! - `item` - Order lines
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p estore-cli -- migrate
//! ```
//!
//! Queries use the runtime-checked sqlx API over `FromRow` row structs; row
//! structs convert into the domain models, surfacing invalid stored data as
//! [`RepositoryError::DataCorruption`].

pub mod cards;
pub mod customers;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cards::CardRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique order number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
