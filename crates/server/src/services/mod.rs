//! Service layer: the order-placement workflow and its collaborators.

pub mod email;
pub mod orders;

pub use email::{Mailer, SmtpMailer};
pub use orders::{OrderError, OrderService};
