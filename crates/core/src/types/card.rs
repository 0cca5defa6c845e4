//! Card number type with display masking.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A payment card number (PAN).
///
/// The raw number is only ever compared and looked up; anything that leaves
/// the system (order records, confirmation emails, logs) must go through
/// [`masked`](Self::masked).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    /// Wrap a raw card number.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Returns the raw card number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display-safe form: every character except the last four replaced by
    /// `'X'`, length preserved.
    ///
    /// Inputs shorter than four characters are returned unchanged.
    ///
    /// ```
    /// use estore_core::CardNumber;
    ///
    /// assert_eq!(
    ///     CardNumber::new("4111111111117865").masked(),
    ///     "XXXXXXXXXXXX7865"
    /// );
    /// assert_eq!(CardNumber::new("123").masked(), "123");
    /// ```
    #[must_use]
    pub fn masked(&self) -> String {
        let visible_from = self.0.chars().count().saturating_sub(4);
        self.0
            .chars()
            .enumerate()
            .map(|(i, c)| if i < visible_from { 'X' } else { c })
            .collect()
    }
}

impl fmt::Display for CardNumber {
    /// Displays the masked form, never the raw number.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<&str> for CardNumber {
    fn from(number: &str) -> Self {
        Self(number.to_owned())
    }
}
