//! Product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use estore_core::{ProductId, ProductStatus};

/// A catalog product with live inventory.
///
/// Invariants: `quantity >= 0` (also enforced by a schema check), and
/// `status` is [`ProductStatus::OutOfStock`] exactly when `quantity` is zero.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}
