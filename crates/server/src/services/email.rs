//! Order confirmation email: template and SMTP delivery.
//!
//! Uses SMTP via lettre for delivery. Confirmations are plaintext,
//! single-part messages.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use estore_core::Email;

use crate::config::EmailConfig;
use crate::models::{Customer, Order, Product};

/// Subject line for order confirmations.
pub const ORDER_CONFIRMATION_SUBJECT: &str = "Order Booked!!!";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Outbound mail transport used by the order workflow.
///
/// No retry or delivery-confirmation semantics; one send per call.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a plaintext message.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the message cannot be built or handed to
    /// the transport.
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Render the order confirmation body.
///
/// Fixed plaintext template embedding the customer name, order number,
/// product name and price, and the order date truncated to second
/// precision.
#[must_use]
pub fn order_confirmation(customer: &Customer, product: &Product, order: &Order) -> String {
    let date = order.date_of_order.format("%Y-%m-%d %H:%M:%S");
    format!(
        "\tE-Store Online E-Commerce Website \n\n\
         Congrats!! \n\
         {name} your order number {order_no} has been ordered successfully. \n\n\
         Product name  : {product_name}\n\
         Product price : {price}\n\
         Order Date    : {date}\n\n\
         Thank you!!!\n\n\
         no-reply this is automated generated mail.",
        name = customer.name,
        order_no = order.order_no,
        product_name = product.name,
        price = product.price,
    )
}

/// SMTP-backed [`Mailer`].
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        self.mailer.send(message).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
