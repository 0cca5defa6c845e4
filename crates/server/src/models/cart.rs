//! Transient cart model consumed by the bulk order path.

use super::{Customer, Product};

/// One cart line: a resolved product and the quantity wanted.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Product,
    pub required_quantity: i32,
}

/// A resolved cart, ready to be converted into an order.
///
/// Not persisted; the caller resolves customer, products, and card before
/// handing the cart to the order workflow.
#[derive(Debug, Clone)]
pub struct Cart {
    pub customer: Customer,
    pub lines: Vec<CartLine>,
}
