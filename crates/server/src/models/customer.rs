//! Customer model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use estore_core::{CustomerId, Email};

/// A registered customer.
///
/// The email address uniquely identifies a customer.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: Email,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
