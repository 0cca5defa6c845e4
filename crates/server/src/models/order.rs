//! Order and order-line models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use estore_core::{CustomerId, Email, ItemId, OrderId, ProductId};

/// A persisted order line.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub product_id: ProductId,
    pub required_quantity: i32,
}

/// An order line that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub product_id: ProductId,
    pub required_quantity: i32,
}

/// An order constructed by the workflow, before persistence.
///
/// `card_used` carries the masked card number only; the raw number is never
/// stored. The single-item placement path leaves `total_value` at zero.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_no: Uuid,
    pub total_value: Decimal,
    pub card_used: String,
    pub customer_id: CustomerId,
    pub items: Vec<NewItem>,
}

/// A persisted order with its lines.
///
/// Immutable once saved; `id` and `date_of_order` are assigned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub order_no: Uuid,
    pub total_value: Decimal,
    pub date_of_order: DateTime<Utc>,
    pub card_used: String,
    pub customer_id: CustomerId,
    pub items: Vec<Item>,
}

/// Order row joined with the owning customer's email.
///
/// Projection used by the reporting scan; items are not loaded.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_no: Uuid,
    pub total_value: Decimal,
    pub date_of_order: DateTime<Utc>,
    pub customer_email: Email,
}
