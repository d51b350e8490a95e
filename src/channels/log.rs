//! Log channel. Writes the notification to the tracing log (dry runs).

use async_trait::async_trait;

use crate::channels::{DeliveryStatus, Notification, Notifier};
use crate::error::DispatchError;

pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryStatus, DispatchError> {
        tracing::info!(
            subject = %notification.subject,
            title = %notification.title,
            body = %notification.body,
            table_bytes = notification.table.as_ref().map_or(0, |t| t.len()),
            "Dry run: notification not sent"
        );
        if let Some(table) = &notification.table {
            tracing::debug!(%table, "Dry run: digest table");
        }
        Ok(DeliveryStatus::Logged)
    }
}
