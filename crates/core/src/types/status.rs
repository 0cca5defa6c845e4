//! Product availability status.

use serde::{Deserialize, Serialize};

/// Availability of a product.
///
/// Invariant: a product is `OutOfStock` exactly when its quantity is zero.
/// The order workflow flips the status when a placement drains the last
/// unit; restocking flows flip it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    InStock,
    OutOfStock,
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "IN_STOCK"),
            Self::OutOfStock => write!(f, "OUT_OF_STOCK"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_STOCK" => Ok(Self::InStock),
            "OUT_OF_STOCK" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}
