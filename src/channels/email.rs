//! Email channel: SMTP via lettre.
//!
//! Sends each notification as a multipart/alternative message: an HTML
//! part carrying the digest table and a plain-text fallback.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};

use crate::channels::{DeliveryStatus, Notification, Notifier};
use crate::error::{ConfigError, DispatchError};

// ── Configuration ───────────────────────────────────────────────────

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// TLS from the first byte (SMTPS, usually port 465).
    Implicit,
    /// Plain connection upgraded with STARTTLS (usually port 587).
    StartTls,
}

/// Email channel configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub tls: SmtpTls,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
    pub recipients: Vec<String>,
}

impl EmailConfig {
    /// Build config from environment variables.
    /// Returns `Ok(None)` if `SMTP_SERVER` is not set (channel disabled).
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(smtp_host) = lookup("SMTP_SERVER").filter(|h| !h.trim().is_empty()) else {
            return Ok(None);
        };

        let tls = match lookup("SMTP_TLS").as_deref().map(str::trim) {
            None | Some("") | Some("implicit") | Some("ssl") => SmtpTls::Implicit,
            Some("starttls") => SmtpTls::StartTls,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "SMTP_TLS".into(),
                    message: format!("'{other}' (expected implicit or starttls)"),
                });
            }
        };

        let smtp_port: u16 = match lookup("SMTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "SMTP_PORT".into(),
                message: format!("'{raw}' is not a port number"),
            })?,
            None => match tls {
                SmtpTls::Implicit => 465,
                SmtpTls::StartTls => 587,
            },
        };

        let username = lookup("SMTP_USER").unwrap_or_default();
        let password = SecretString::from(lookup("SMTP_PASSWORD").unwrap_or_default());
        let from_address = lookup("SMTP_FROM").unwrap_or_else(|| username.clone());
        if from_address.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "SMTP_FROM".into(),
                hint: "Set SMTP_FROM (or SMTP_USER) to the sender address.".into(),
            });
        }

        let recipients: Vec<String> = lookup("SMTP_TO")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "SMTP_TO".into(),
                hint: "Set SMTP_TO to one or more comma-separated addresses.".into(),
            });
        }

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            tls,
            username,
            password,
            from_address,
            recipients,
        }))
    }
}

// ── Channel ─────────────────────────────────────────────────────────

/// Email notifier. One SMTP session per notification.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Build the MIME message for a notification.
    pub fn build_message(&self, notification: &Notification) -> Result<Message, DispatchError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&self.config.from_address)?)
            .subject(notification.subject.as_str());
        for recipient in &self.config.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                render_plain(notification),
                render_html(notification),
            ))
            .map_err(|e| DispatchError::Build(format!("Failed to build email: {e}")))
    }

    fn transport(&self) -> Result<SmtpTransport, DispatchError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );

        let builder = match self.config.tls {
            SmtpTls::Implicit => SmtpTransport::relay(&self.config.smtp_host),
            SmtpTls::StartTls => SmtpTransport::starttls_relay(&self.config.smtp_host),
        }
        .map_err(|e| DispatchError::SendFailed {
            name: "email".into(),
            reason: format!("SMTP relay error: {e}"),
        })?;

        Ok(builder
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, notification: &Notification) -> Result<DeliveryStatus, DispatchError> {
        let email = self.build_message(notification)?;
        let transport = self.transport()?;

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| DispatchError::SendFailed {
                name: "email".into(),
                reason: format!("SMTP task failed: {e}"),
            })?
            .map_err(|e| DispatchError::SendFailed {
                name: "email".into(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        tracing::info!(
            recipients = self.config.recipients.len(),
            subject = %notification.subject,
            "Email sent"
        );
        Ok(DeliveryStatus::Sent {
            recipients: self.config.recipients.clone(),
        })
    }
}

// ── Helpers (public for testing) ────────────────────────────────────

fn parse_mailbox(address: &str) -> Result<Mailbox, DispatchError> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| DispatchError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Full HTML document for a notification. The table fragment is inserted
/// as-is; title and body are escaped.
pub fn render_html(notification: &Notification) -> String {
    let table = notification.table.as_deref().unwrap_or("");
    format!(
        r#"<!DOCTYPE html>
<html lang="pl">
<head><meta charset="utf-8"><title>{subject}</title></head>
<body style="margin: 0; padding: 24px; background-color: #f7fafc; font-family: Helvetica, Arial, sans-serif;">
<h1 style="font-size: 20px; line-height: 24px; margin: 0 0 16px;">{title}</h1>
<p style="font-size: 14px; line-height: 20px; margin: 0 0 16px;">{body}</p>
{table}
</body>
</html>"#,
        subject = escape_html(&notification.subject),
        title = escape_html(&notification.title),
        body = escape_html(&notification.body),
    )
}

/// Plain-text alternative for clients that do not render HTML.
pub fn render_plain(notification: &Notification) -> String {
    let mut text = format!("{}\n\n{}\n", notification.title, notification.body);
    if notification.table.is_some() {
        text.push_str("\nZestawienie aktów jest dostępne w wersji HTML tej wiadomości.\n");
    }
    text
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
