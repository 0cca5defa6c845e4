//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Email sender address
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SMTP_PORT: u16 = 587;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Email configuration
    pub email: EmailConfig,
    /// Sentry error tracking DSN (optional)
    pub sentry_dsn: Option<String>,
}

/// SMTP configuration for outbound confirmation email.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL").map(SecretString::from)?;

        let host = parsed("HOST", DEFAULT_HOST.to_string())?;
        let port = parsed("PORT", DEFAULT_PORT.to_string())?;

        let email = EmailConfig {
            smtp_host: required("SMTP_HOST")?,
            smtp_port: parsed("SMTP_PORT", DEFAULT_SMTP_PORT.to_string())?,
            smtp_username: required("SMTP_USERNAME")?,
            smtp_password: required("SMTP_PASSWORD").map(SecretString::from)?,
            from_address: required("SMTP_FROM")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            email,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read a required environment variable.
fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Read an optional environment variable and parse it, falling back to a
/// default when unset.
fn parsed<T>(name: &str, default: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .unwrap_or(default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}
