//! Contact form delivery.
//!
//! The contact handler validates a submission and hands it to a
//! `ContactSender`. Delivery (SMTP, a ticketing API, ...) is left to the
//! implementation; the default `LogContactSender` only records the message.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}

#[async_trait]
pub trait ContactSender: Send + Sync {
    /// Deliver a message or return an error so the caller can report failure.
    async fn send(&self, message: &ContactMessage) -> Result<()>;
}

/// Sender that logs the submission instead of delivering it.
#[derive(Clone, Debug, Default)]
pub struct LogContactSender;

#[async_trait]
impl ContactSender for LogContactSender {
    async fn send(&self, message: &ContactMessage) -> Result<()> {
        info!(
            name = %message.name,
            email = %message.email,
            company = message.company.as_deref().unwrap_or("-"),
            length = message.message.chars().count(),
            "contact form submission"
        );
        Ok(())
    }
}
