//! Database operations for customers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use estore_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::Customer;
use crate::services::orders::CustomerStore;

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            email,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

/// Repository for customer database operations.
#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, email, name, created_at
            FROM customer
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }
}
