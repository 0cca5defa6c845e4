//! The order-placement workflow.
//!
//! Validates a placement request against the customer, product, and card
//! stores, decrements inventory, persists the order, and triggers the
//! confirmation email. Collaborators are passed in as trait objects by the
//! composition root; the workflow itself holds no connection state.
//!
//! Execution is request-scoped and synchronous: each call runs to
//! completion before returning, and no mutation happens until the whole
//! validation chain has passed. Two concurrent placements against the same
//! product can both pass the stock check before either decrement lands;
//! callers that need stronger guarantees must serialize placements per
//! product.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use estore_core::{CardNumber, Email, OrderId, ProductId, ProductStatus};

use super::email::{Mailer, ORDER_CONFIRMATION_SUBJECT, order_confirmation};
use crate::db::RepositoryError;
use crate::models::{Card, Cart, Customer, Item, NewItem, NewOrder, Order, OrderSummary, Product};

/// Customer lookup used by the order workflow.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError>;
}

/// Product lookup and inventory persistence.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Persist a new quantity and status for a product.
    async fn update_stock(
        &self,
        id: ProductId,
        quantity: i32,
        status: ProductStatus,
    ) -> Result<(), RepositoryError>;
}

/// Stored-card lookup.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>, RepositoryError>;
}

/// Order persistence and reporting queries.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order together with its lines.
    async fn save(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Every order joined with its customer's email, unordered.
    async fn find_all(&self) -> Result<Vec<OrderSummary>, RepositoryError>;

    async fn top5_by_value(&self) -> Result<Vec<OrderId>, RepositoryError>;

    async fn top5_recent(&self) -> Result<Vec<OrderId>, RepositoryError>;
}

/// Errors surfaced by the order workflow. None are retried internally.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No customer is registered under the given email.
    #[error("customer does not exist")]
    CustomerNotFound,

    /// The requested product is not in the catalog.
    #[error("product does not exist")]
    ProductNotFound,

    /// The requested quantity is zero or negative.
    #[error("order quantity must be positive")]
    InvalidQuantity,

    /// The product's stock does not cover the requested quantity.
    #[error("the required quantity is not available")]
    InsufficientQuantity,

    /// Unknown card, CVV mismatch, expired card, or a card owned by a
    /// different customer.
    #[error("this card cannot be used")]
    InvalidCard,

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// An order placement request for a single product.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_email: Email,
    pub product_id: ProductId,
    pub required_quantity: i32,
    pub card_no: CardNumber,
    pub cvv: i32,
}

/// Response projection of a freshly placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_no: Uuid,
    pub date_of_order: DateTime<Utc>,
    pub total_value: Decimal,
    pub card_used: String,
    pub items: Vec<Item>,
}

impl From<Order> for OrderConfirmation {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            order_no: order.order_no,
            date_of_order: order.date_of_order,
            total_value: order.total_value,
            card_used: order.card_used,
            items: order.items,
        }
    }
}

/// The order-placement service.
///
/// Holds one reference per collaborator, passed in by the composition root.
#[derive(Clone)]
pub struct OrderService {
    customers: Arc<dyn CustomerStore>,
    products: Arc<dyn ProductStore>,
    cards: Arc<dyn CardStore>,
    orders: Arc<dyn OrderStore>,
    mailer: Arc<dyn Mailer>,
}

impl OrderService {
    /// Create a new order service from its collaborators.
    #[must_use]
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        products: Arc<dyn ProductStore>,
        cards: Arc<dyn CardStore>,
        orders: Arc<dyn OrderStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            customers,
            products,
            cards,
            orders,
            mailer,
        }
    }

    /// Place an order for a single product.
    ///
    /// Validation runs in a fixed sequence - customer, product, quantity,
    /// stock, card - and the first failing step terminates the call before
    /// any mutation. On success: the product's stock is decremented (status
    /// flips to `OUT_OF_STOCK` when it reaches zero), the order and its
    /// single line are persisted, and a confirmation email is sent to the
    /// customer. A failed send is logged and does not fail the placement;
    /// the order is already durable at that point.
    ///
    /// The total value is left at zero on this path; only the cart path
    /// computes totals.
    ///
    /// # Errors
    ///
    /// One of the five validation variants of [`OrderError`], or
    /// [`OrderError::Store`] if persistence fails.
    pub async fn place_order(
        &self,
        request: &PlaceOrderRequest,
    ) -> Result<OrderConfirmation, OrderError> {
        let customer = self
            .customers
            .find_by_email(&request.customer_email)
            .await?
            .ok_or(OrderError::CustomerNotFound)?;

        let product = self
            .products
            .find_by_id(request.product_id)
            .await?
            .ok_or(OrderError::ProductNotFound)?;

        if request.required_quantity <= 0 {
            return Err(OrderError::InvalidQuantity);
        }

        if product.quantity < request.required_quantity {
            return Err(OrderError::InsufficientQuantity);
        }

        let card = self
            .usable_card(&request.card_no, request.cvv, &customer)
            .await?;

        let new_quantity = product.quantity - request.required_quantity;
        let status = if new_quantity == 0 {
            ProductStatus::OutOfStock
        } else {
            product.status
        };
        self.products
            .update_stock(product.id, new_quantity, status)
            .await?;

        let order = NewOrder {
            order_no: Uuid::new_v4(),
            total_value: Decimal::ZERO,
            card_used: card.number.masked(),
            customer_id: customer.id,
            items: vec![NewItem {
                product_id: product.id,
                required_quantity: request.required_quantity,
            }],
        };
        let saved = self.orders.save(order).await?;

        let body = order_confirmation(&customer, &product, &saved);
        if let Err(e) = self
            .mailer
            .send(&customer.email, ORDER_CONFIRMATION_SUBJECT, &body)
            .await
        {
            tracing::error!(
                order_no = %saved.order_no,
                error = %e,
                "Failed to send order confirmation"
            );
        }

        tracing::info!(
            order_no = %saved.order_no,
            customer = %customer.email,
            product = %product.id,
            "Order placed"
        );

        Ok(OrderConfirmation::from(saved))
    }

    /// Convert a pre-resolved cart into an order, decrementing stock per
    /// line and accumulating the total value.
    ///
    /// This path assumes the caller already resolved the customer, the
    /// products, and the card; it performs no existence or card validation
    /// and sends no notification. Lines are processed in cart order, and a
    /// line that exceeds the available stock fails the call immediately -
    /// decrements already persisted for earlier lines stay in place. The
    /// returned order is not persisted; the caller saves it.
    ///
    /// # Errors
    ///
    /// [`OrderError::InsufficientQuantity`] for the first line whose
    /// quantity exceeds stock, or [`OrderError::Store`] if a decrement
    /// fails to persist.
    pub async fn place_cart_order(&self, card: &Card, cart: Cart) -> Result<NewOrder, OrderError> {
        let mut total_value = Decimal::ZERO;
        let mut items = Vec::with_capacity(cart.lines.len());

        for line in &cart.lines {
            let product = &line.product;
            if line.required_quantity > product.quantity {
                return Err(OrderError::InsufficientQuantity);
            }

            total_value += Decimal::from(line.required_quantity) * product.price;

            let new_quantity = product.quantity - line.required_quantity;
            let status = if new_quantity == 0 {
                ProductStatus::OutOfStock
            } else {
                product.status
            };
            self.products
                .update_stock(product.id, new_quantity, status)
                .await?;

            items.push(NewItem {
                product_id: product.id,
                required_quantity: line.required_quantity,
            });
        }

        Ok(NewOrder {
            order_no: Uuid::new_v4(),
            total_value,
            card_used: card.number.masked(),
            customer_id: cart.customer.id,
            items,
        })
    }

    /// IDs of the five orders with the highest total value.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the query fails.
    pub async fn top5_by_value(&self) -> Result<Vec<OrderId>, OrderError> {
        Ok(self.orders.top5_by_value().await?)
    }

    /// IDs of the five most recently placed orders.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the query fails.
    pub async fn top5_recent(&self) -> Result<Vec<OrderId>, OrderError> {
        Ok(self.orders.top5_recent().await?)
    }

    /// IDs of every order belonging to the customer with the given email.
    ///
    /// Scans the full order set and filters by the owning customer's email;
    /// no ordering is guaranteed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Store`] if the query fails.
    pub async fn orders_of_customer(&self, email: &Email) -> Result<Vec<OrderId>, OrderError> {
        let all = self.orders.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|order| order.customer_email == *email)
            .map(|order| order.id)
            .collect())
    }

    /// Resolve a card and check that this customer may pay with it.
    ///
    /// A card is usable only if it exists, the CVV matches, it has not
    /// expired, and it belongs to the resolved customer. All four failures
    /// collapse into [`OrderError::InvalidCard`].
    async fn usable_card(
        &self,
        number: &CardNumber,
        cvv: i32,
        customer: &Customer,
    ) -> Result<Card, OrderError> {
        let Some(card) = self.cards.find_by_number(number).await? else {
            return Err(OrderError::InvalidCard);
        };

        if card.cvv != cvv || card.is_expired_at(Utc::now()) || card.customer_id != customer.id {
            return Err(OrderError::InvalidCard);
        }

        Ok(card)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Duration;

    use estore_core::CustomerId;

    use super::*;
    use crate::models::CartLine;
    use crate::services::email::EmailError;

    // =========================================================================
    // In-memory collaborators
    // =========================================================================

    #[derive(Default)]
    struct MemStore {
        customers: Vec<Customer>,
        cards: Vec<Card>,
        products: Mutex<HashMap<ProductId, Product>>,
        orders: Mutex<Vec<Order>>,
    }

    impl MemStore {
        fn product(&self, id: ProductId) -> Product {
            self.products.lock().unwrap().get(&id).unwrap().clone()
        }

        fn saved_orders(&self) -> Vec<Order> {
            self.orders.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CustomerStore for MemStore {
        async fn find_by_email(
            &self,
            email: &Email,
        ) -> Result<Option<Customer>, RepositoryError> {
            Ok(self.customers.iter().find(|c| c.email == *email).cloned())
        }
    }

    #[async_trait]
    impl ProductStore for MemStore {
        async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        async fn update_stock(
            &self,
            id: ProductId,
            quantity: i32,
            status: ProductStatus,
        ) -> Result<(), RepositoryError> {
            let mut products = self.products.lock().unwrap();
            let product = products.get_mut(&id).ok_or(RepositoryError::NotFound)?;
            product.quantity = quantity;
            product.status = status;
            Ok(())
        }
    }

    #[async_trait]
    impl CardStore for MemStore {
        async fn find_by_number(
            &self,
            number: &CardNumber,
        ) -> Result<Option<Card>, RepositoryError> {
            Ok(self.cards.iter().find(|c| c.number == *number).cloned())
        }
    }

    #[async_trait]
    impl OrderStore for MemStore {
        async fn save(&self, order: NewOrder) -> Result<Order, RepositoryError> {
            let mut orders = self.orders.lock().unwrap();
            let id = i32::try_from(orders.len()).unwrap() + 1;
            let saved = Order {
                id: OrderId::new(id),
                order_no: order.order_no,
                total_value: order.total_value,
                date_of_order: Utc::now(),
                card_used: order.card_used,
                customer_id: order.customer_id,
                items: order
                    .items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Item {
                        id: estore_core::ItemId::new(i32::try_from(i).unwrap() + 1),
                        product_id: item.product_id,
                        required_quantity: item.required_quantity,
                    })
                    .collect(),
            };
            orders.push(saved.clone());
            Ok(saved)
        }

        async fn find_all(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
            let orders = self.orders.lock().unwrap();
            orders
                .iter()
                .map(|order| {
                    let customer = self
                        .customers
                        .iter()
                        .find(|c| c.id == order.customer_id)
                        .ok_or(RepositoryError::NotFound)?;
                    Ok(OrderSummary {
                        id: order.id,
                        order_no: order.order_no,
                        total_value: order.total_value,
                        date_of_order: order.date_of_order,
                        customer_email: customer.email.clone(),
                    })
                })
                .collect()
        }

        async fn top5_by_value(&self) -> Result<Vec<OrderId>, RepositoryError> {
            let mut orders = self.saved_orders();
            orders.sort_by(|a, b| b.total_value.cmp(&a.total_value));
            Ok(orders.into_iter().take(5).map(|o| o.id).collect())
        }

        async fn top5_recent(&self) -> Result<Vec<OrderId>, RepositoryError> {
            let mut orders = self.saved_orders();
            orders.sort_by(|a, b| b.date_of_order.cmp(&a.date_of_order));
            Ok(orders.into_iter().take(5).map(|o| o.id).collect())
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingMailer {
        fn messages(&self) -> Vec<(String, String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push((
                to.to_string(),
                subject.to_string(),
                body.to_string(),
            ));
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _: &Email, _: &str, _: &str) -> Result<(), EmailError> {
            Err(EmailError::InvalidAddress("transport down".to_string()))
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    const CARD_NO: &str = "4111111111117865";
    const CVV: i32 = 737;

    fn customer(id: i32, email: &str, name: &str) -> Customer {
        Customer {
            id: CustomerId::new(id),
            email: Email::parse(email).unwrap(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn product(id: i32, name: &str, price: i64, quantity: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::from(price),
            quantity,
            status: if quantity == 0 {
                ProductStatus::OutOfStock
            } else {
                ProductStatus::InStock
            },
            created_at: Utc::now(),
        }
    }

    fn card(number: &str, cvv: i32, owner: i32, valid_till: DateTime<Utc>) -> Card {
        Card {
            number: CardNumber::new(number),
            cvv,
            valid_till,
            customer_id: CustomerId::new(owner),
        }
    }

    /// One customer (id 1), one product (id 1, price 10, stock 5), one
    /// valid card on file.
    fn world() -> MemStore {
        let store = MemStore {
            customers: vec![customer(1, "jo@example.com", "Jo")],
            cards: vec![card(CARD_NO, CVV, 1, Utc::now() + Duration::days(365))],
            ..MemStore::default()
        };
        store
            .products
            .lock()
            .unwrap()
            .insert(ProductId::new(1), product(1, "Keyboard", 10, 5));
        store
    }

    fn service(store: &Arc<MemStore>, mailer: Arc<dyn Mailer>) -> OrderService {
        OrderService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            mailer,
        )
    }

    fn request(email: &str, product_id: i32, quantity: i32) -> PlaceOrderRequest {
        PlaceOrderRequest {
            customer_email: Email::parse(email).unwrap(),
            product_id: ProductId::new(product_id),
            required_quantity: quantity,
            card_no: CardNumber::new(CARD_NO),
            cvv: CVV,
        }
    }

    // =========================================================================
    // Single-item path: validation chain
    // =========================================================================

    #[tokio::test]
    async fn test_unknown_customer_fails_without_mutation() {
        let store = Arc::new(world());
        let mailer = Arc::new(RecordingMailer::default());
        let svc = service(&store, mailer.clone());

        let err = svc
            .place_order(&request("ghost@example.com", 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::CustomerNotFound));
        assert_eq!(store.product(ProductId::new(1)).quantity, 5);
        assert!(store.saved_orders().is_empty());
        assert!(mailer.messages().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_fails() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        let err = svc
            .place_order(&request("jo@example.com", 99, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductNotFound));
        assert!(store.saved_orders().is_empty());
    }

    #[tokio::test]
    async fn test_product_check_precedes_quantity_check() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        // Both the product and the quantity are bad; the product lookup
        // runs first.
        let err = svc
            .place_order(&request("jo@example.com", 99, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::ProductNotFound));
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_invalid_regardless_of_stock() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        for quantity in [0, -3] {
            let err = svc
                .place_order(&request("jo@example.com", 1, quantity))
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::InvalidQuantity));
        }
        assert_eq!(store.product(ProductId::new(1)).quantity, 5);
    }

    #[tokio::test]
    async fn test_insufficient_stock_fails_before_card_check() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        let mut req = request("jo@example.com", 1, 6);
        req.cvv = 0; // also wrong, but stock is checked first

        let err = svc.place_order(&req).await.unwrap_err();

        assert!(matches!(err, OrderError::InsufficientQuantity));
        assert_eq!(store.product(ProductId::new(1)).quantity, 5);
    }

    #[tokio::test]
    async fn test_card_rejections() {
        let mut store = world();
        store.cards.push(card(
            "5500005555555559",
            CVV,
            2,
            Utc::now() + Duration::days(365),
        ));
        store
            .cards
            .push(card("377400111111115", CVV, 1, Utc::now() - Duration::days(1)));
        let store = Arc::new(store);
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        // Unknown card number.
        let mut req = request("jo@example.com", 1, 1);
        req.card_no = CardNumber::new("0000000000000000");
        assert!(matches!(
            svc.place_order(&req).await.unwrap_err(),
            OrderError::InvalidCard
        ));

        // CVV mismatch.
        let mut req = request("jo@example.com", 1, 1);
        req.cvv = CVV + 1;
        assert!(matches!(
            svc.place_order(&req).await.unwrap_err(),
            OrderError::InvalidCard
        ));

        // Expired card.
        let mut req = request("jo@example.com", 1, 1);
        req.card_no = CardNumber::new("377400111111115");
        assert!(matches!(
            svc.place_order(&req).await.unwrap_err(),
            OrderError::InvalidCard
        ));

        // Card owned by a different customer.
        let mut req = request("jo@example.com", 1, 1);
        req.card_no = CardNumber::new("5500005555555559");
        assert!(matches!(
            svc.place_order(&req).await.unwrap_err(),
            OrderError::InvalidCard
        ));

        // Nothing was mutated across any of the rejections.
        assert_eq!(store.product(ProductId::new(1)).quantity, 5);
        assert!(store.saved_orders().is_empty());
    }

    // =========================================================================
    // Single-item path: success
    // =========================================================================

    #[tokio::test]
    async fn test_successful_placement() {
        let store = Arc::new(world());
        let mailer = Arc::new(RecordingMailer::default());
        let svc = service(&store, mailer.clone());

        let confirmation = svc
            .place_order(&request("jo@example.com", 1, 2))
            .await
            .unwrap();

        // Stock decremented by exactly the requested quantity, still in stock.
        let product = store.product(ProductId::new(1));
        assert_eq!(product.quantity, 3);
        assert_eq!(product.status, ProductStatus::InStock);

        // Exactly one order with one line; total left at zero on this path.
        let orders = store.saved_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].required_quantity, 2);
        assert_eq!(confirmation.total_value, Decimal::ZERO);

        // Masked card: last four digits kept, length preserved.
        assert_eq!(confirmation.card_used, "XXXXXXXXXXXX7865");

        // The customer's order history gained exactly this order.
        let history = svc
            .orders_of_customer(&Email::parse("jo@example.com").unwrap())
            .await
            .unwrap();
        assert_eq!(history, vec![confirmation.order_id]);

        // One confirmation email to the customer.
        let messages = mailer.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "jo@example.com");
        assert_eq!(messages[0].1, ORDER_CONFIRMATION_SUBJECT);
        assert!(messages[0].2.contains(&confirmation.order_no.to_string()));
    }

    #[tokio::test]
    async fn test_draining_stock_flips_status() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        svc.place_order(&request("jo@example.com", 1, 5))
            .await
            .unwrap();

        let product = store.product(ProductId::new(1));
        assert_eq!(product.quantity, 0);
        assert_eq!(product.status, ProductStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_fail_placement() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(FailingMailer));

        let confirmation = svc
            .place_order(&request("jo@example.com", 1, 1))
            .await
            .unwrap();

        // The order is durable even though the notification failed.
        assert_eq!(store.saved_orders().len(), 1);
        assert_eq!(store.saved_orders()[0].order_no, confirmation.order_no);
    }

    // =========================================================================
    // Cart path
    // =========================================================================

    #[tokio::test]
    async fn test_cart_totals_and_decrements() {
        let store = Arc::new(world());
        store
            .products
            .lock()
            .unwrap()
            .insert(ProductId::new(2), product(2, "Mouse", 5, 4));
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        let cart = Cart {
            customer: customer(1, "jo@example.com", "Jo"),
            lines: vec![
                CartLine {
                    product: store.product(ProductId::new(1)),
                    required_quantity: 2,
                },
                CartLine {
                    product: store.product(ProductId::new(2)),
                    required_quantity: 1,
                },
            ],
        };
        let pay_with = card(CARD_NO, CVV, 1, Utc::now() + Duration::days(365));

        let order = svc.place_cart_order(&pay_with, cart).await.unwrap();

        assert_eq!(order.total_value, Decimal::from(25));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.customer_id, CustomerId::new(1));
        assert_eq!(order.card_used, "XXXXXXXXXXXX7865");
        assert_eq!(store.product(ProductId::new(1)).quantity, 3);
        assert_eq!(store.product(ProductId::new(2)).quantity, 3);

        // The order is returned unsaved and no notification goes out.
        assert!(store.saved_orders().is_empty());
    }

    #[tokio::test]
    async fn test_cart_sellout_line_flips_status() {
        let store = Arc::new(world());
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        let cart = Cart {
            customer: customer(1, "jo@example.com", "Jo"),
            lines: vec![CartLine {
                product: store.product(ProductId::new(1)),
                required_quantity: 5,
            }],
        };
        let pay_with = card(CARD_NO, CVV, 1, Utc::now() + Duration::days(365));

        svc.place_cart_order(&pay_with, cart).await.unwrap();

        assert_eq!(
            store.product(ProductId::new(1)).status,
            ProductStatus::OutOfStock
        );
    }

    #[tokio::test]
    async fn test_cart_failure_keeps_earlier_decrements() {
        let store = Arc::new(world());
        store
            .products
            .lock()
            .unwrap()
            .insert(ProductId::new(2), product(2, "Mouse", 5, 1));
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        let cart = Cart {
            customer: customer(1, "jo@example.com", "Jo"),
            lines: vec![
                CartLine {
                    product: store.product(ProductId::new(1)),
                    required_quantity: 2,
                },
                CartLine {
                    product: store.product(ProductId::new(2)),
                    required_quantity: 3,
                },
            ],
        };
        let pay_with = card(CARD_NO, CVV, 1, Utc::now() + Duration::days(365));

        let err = svc.place_cart_order(&pay_with, cart).await.unwrap_err();

        assert!(matches!(err, OrderError::InsufficientQuantity));
        // The first line's decrement is not rolled back.
        assert_eq!(store.product(ProductId::new(1)).quantity, 3);
        assert_eq!(store.product(ProductId::new(2)).quantity, 1);
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    #[tokio::test]
    async fn test_orders_of_customer_filters_by_email() {
        let mut base = world();
        base.customers.push(customer(2, "sam@example.com", "Sam"));
        base.cards.push(card(
            "5500005555555559",
            CVV,
            2,
            Utc::now() + Duration::days(365),
        ));
        let store = Arc::new(base);
        let svc = service(&store, Arc::new(RecordingMailer::default()));

        let jo_order = svc
            .place_order(&request("jo@example.com", 1, 1))
            .await
            .unwrap();

        let mut sam_req = request("sam@example.com", 1, 1);
        sam_req.card_no = CardNumber::new("5500005555555559");
        let sam_order = svc.place_order(&sam_req).await.unwrap();

        let jo_history = svc
            .orders_of_customer(&Email::parse("jo@example.com").unwrap())
            .await
            .unwrap();
        let sam_history = svc
            .orders_of_customer(&Email::parse("sam@example.com").unwrap())
            .await
            .unwrap();
        let ghost_history = svc
            .orders_of_customer(&Email::parse("ghost@example.com").unwrap())
            .await
            .unwrap();

        assert_eq!(jo_history, vec![jo_order.order_id]);
        assert_eq!(sam_history, vec![sam_order.order_id]);
        assert!(ghost_history.is_empty());
    }

    #[tokio::test]
    async fn test_top5_by_value_orders_by_total() {
        let store = Arc::new(world());
        store
            .products
            .lock()
            .unwrap()
            .insert(ProductId::new(3), product(3, "Monitor", 10, 20));
        let svc = service(&store, Arc::new(RecordingMailer::default()));
        let pay_with = card(CARD_NO, CVV, 1, Utc::now() + Duration::days(365));

        // Three cart orders with totals 10, 30, 20.
        for quantity in [1, 3, 2] {
            let cart = Cart {
                customer: customer(1, "jo@example.com", "Jo"),
                lines: vec![CartLine {
                    product: store.product(ProductId::new(3)),
                    required_quantity: quantity,
                }],
            };
            let order = svc.place_cart_order(&pay_with, cart).await.unwrap();
            store.save(order).await.unwrap();
        }

        let top = svc.top5_by_value().await.unwrap();
        assert_eq!(top, vec![OrderId::new(2), OrderId::new(3), OrderId::new(1)]);
    }
}
