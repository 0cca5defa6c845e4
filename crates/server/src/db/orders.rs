//! Database operations for orders and their lines.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use estore_core::{CustomerId, Email, ItemId, OrderId, ProductId};

use super::RepositoryError;
use crate::models::{Item, NewOrder, Order, OrderSummary};
use crate::services::orders::OrderStore;

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_no: Uuid,
    total_value: Decimal,
    date_of_order: DateTime<Utc>,
    card_used: String,
    customer_id: i32,
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i32,
    product_id: i32,
    required_quantity: i32,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            required_quantity: row.required_quantity,
        }
    }
}

/// Internal row type for the order/customer join.
#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: i32,
    order_no: Uuid,
    total_value: Decimal,
    date_of_order: DateTime<Utc>,
    customer_email: String,
}

impl TryFrom<OrderSummaryRow> for OrderSummary {
    type Error = RepositoryError;

    fn try_from(row: OrderSummaryRow) -> Result<Self, Self::Error> {
        let customer_email = Email::parse(&row.customer_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_no: row.order_no,
            total_value: row.total_value,
            date_of_order: row.date_of_order,
            customer_email,
        })
    }
}

/// Repository for order database operations.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    /// Persist an order and its lines in one transaction.
    async fn save(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO order_info (order_no, total_value, card_used, customer_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_no, total_value, date_of_order, card_used, customer_id
            ",
        )
        .bind(order.order_no)
        .bind(order.total_value)
        .bind(&order.card_used)
        .bind(order.customer_id.as_i32())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("order_info_order_no_key")
            {
                return RepositoryError::Conflict("duplicate order number".to_string());
            }
            RepositoryError::Database(e)
        })?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let item_row = sqlx::query_as::<_, ItemRow>(
                r"
                INSERT INTO item (order_id, product_id, required_quantity)
                VALUES ($1, $2, $3)
                RETURNING id, product_id, required_quantity
                ",
            )
            .bind(row.id)
            .bind(item.product_id.as_i32())
            .bind(item.required_quantity)
            .fetch_one(&mut *tx)
            .await?;

            items.push(Item::from(item_row));
        }

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(row.id),
            order_no: row.order_no,
            total_value: row.total_value,
            date_of_order: row.date_of_order,
            card_used: row.card_used,
            customer_id: CustomerId::new(row.customer_id),
            items,
        })
    }

    /// Every order joined with its customer's email, unordered.
    async fn find_all(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r"
            SELECT o.id, o.order_no, o.total_value, o.date_of_order,
                   c.email AS customer_email
            FROM order_info o
            INNER JOIN customer c ON c.id = o.customer_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderSummary::try_from).collect()
    }

    async fn top5_by_value(&self) -> Result<Vec<OrderId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, i32>(
            r"
            SELECT id
            FROM order_info
            ORDER BY total_value DESC
            LIMIT 5
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(OrderId::new).collect())
    }

    async fn top5_recent(&self) -> Result<Vec<OrderId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, i32>(
            r"
            SELECT id
            FROM order_info
            ORDER BY date_of_order DESC
            LIMIT 5
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(OrderId::new).collect())
    }
}
