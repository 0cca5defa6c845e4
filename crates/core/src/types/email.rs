//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailParseError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string exceeds the RFC 5321 length limit.
    #[error("email must be at most {0} characters")]
    TooLong(usize),
    /// The input is not of the form `local@domain`.
    #[error("email must be of the form local@domain")]
    Malformed,
}

/// A customer email address.
///
/// Uniquely identifies a customer (see the `customer` table's unique
/// constraint). Validation is structural only: a non-empty local part and
/// domain separated by a single `@`.
///
/// ```
/// use estore_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("not-an-email").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// or not of the form `local@domain` with both halves non-empty.
    pub fn parse(s: &str) -> Result<Self, EmailParseError> {
        if s.is_empty() {
            return Err(EmailParseError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailParseError::TooLong(Self::MAX_LENGTH));
        }
        match s.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailParseError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
