//! Domain models for the order service.
//!
//! Ownership is unidirectional: an [`Order`](order::Order) owns its items,
//! items reference their product by ID, and customer/product order history
//! is derived at query time rather than held as back-references.

pub mod card;
pub mod cart;
pub mod customer;
pub mod order;
pub mod product;

pub use card::Card;
pub use cart::{Cart, CartLine};
pub use customer::Customer;
pub use order::{Item, NewItem, NewOrder, Order, OrderSummary};
pub use product::Product;
