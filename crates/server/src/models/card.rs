//! Stored payment card model.

use chrono::{DateTime, Utc};

use estore_core::{CardNumber, CustomerId};

/// A payment card on file.
///
/// Keyed by its card number. A card is usable only by its owning customer,
/// only before `valid_till`, and only with a matching CVV.
#[derive(Debug, Clone)]
pub struct Card {
    pub number: CardNumber,
    pub cvv: i32,
    pub valid_till: DateTime<Utc>,
    pub customer_id: CustomerId,
}

impl Card {
    /// Whether the card has passed its expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_till
    }
}
