//! Notification channels for the digest.
//!
//! A channel takes one [`Notification`] and reports how it was delivered.
//! The pipeline never retries a failed dispatch.

pub mod email;
pub mod log;

pub use email::{EmailConfig, EmailNotifier};
pub use log::LogNotifier;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::DispatchError;

/// One outgoing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub title: String,
    pub body: String,
    /// Pre-rendered HTML table fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl Notification {
    pub fn new(
        subject: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            title: title.into(),
            body: body.into(),
            table: None,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// How a notification left the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Accepted by the mail server for these recipients.
    Sent { recipients: Vec<String> },
    /// Written to the log only.
    Logged,
}

/// Sink for digest notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name, for logs.
    fn name(&self) -> &str;

    /// Deliver one notification.
    async fn send(&self, notification: &Notification) -> Result<DeliveryStatus, DispatchError>;
}
