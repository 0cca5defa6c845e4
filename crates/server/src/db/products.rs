//! Database operations for products and inventory updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use estore_core::{ProductId, ProductStatus};

use super::RepositoryError;
use crate::models::Product;
use crate::services::orders::ProductStore;

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    quantity: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let status: ProductStatus = row.status.parse().map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            status,
            created_at: row.created_at,
        })
    }
}

/// Repository for product database operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, quantity, status, created_at
            FROM product
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn update_stock(
        &self,
        id: ProductId,
        quantity: i32,
        status: ProductStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product
            SET quantity = $2, status = $3
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .bind(quantity)
        .bind(status.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
