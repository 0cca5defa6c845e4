//! Database operations for stored payment cards.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use estore_core::{CardNumber, CustomerId};

use super::RepositoryError;
use crate::models::Card;
use crate::services::orders::CardStore;

/// Internal row type for card queries.
#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    card_no: String,
    cvv: i32,
    valid_till: DateTime<Utc>,
    customer_id: i32,
}

impl From<CardRow> for Card {
    fn from(row: CardRow) -> Self {
        Self {
            number: CardNumber::new(row.card_no),
            cvv: row.cvv,
            valid_till: row.valid_till,
            customer_id: CustomerId::new(row.customer_id),
        }
    }
}

/// Repository for card database operations.
#[derive(Clone)]
pub struct CardRepository {
    pool: PgPool,
}

impl CardRepository {
    /// Create a new card repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardStore for CardRepository {
    async fn find_by_number(&self, number: &CardNumber) -> Result<Option<Card>, RepositoryError> {
        let row = sqlx::query_as::<_, CardRow>(
            r"
            SELECT card_no, cvv, valid_till, customer_id
            FROM card
            WHERE card_no = $1
            ",
        )
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Card::from))
    }
}
