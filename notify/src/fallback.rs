//! Mailers that never touch the network.

use booking_core::email::{Delivery, EmailMessage, MailFuture, Mailer};

/// Writes each message to the log instead of sending it.
///
/// Meant for local development, where seeing the composed mail is enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    fn send(&self, message: EmailMessage) -> MailFuture<'_> {
        Box::pin(async move {
            tracing::info!(
                to = %message.to,
                subject = %message.subject,
                body = %message.text,
                "email (console mode)"
            );
            Ok(Delivery::Sent)
        })
    }
}

/// Stand-in used when SMTP settings are incomplete.
///
/// Every send is skipped with a warning naming what is missing.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredMailer {
    missing: Vec<&'static str>,
}

impl UnconfiguredMailer {
    /// Mailer reporting the given missing settings.
    #[must_use]
    pub const fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }

    /// Settings that were absent.
    #[must_use]
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }
}

impl Mailer for UnconfiguredMailer {
    fn send(&self, message: EmailMessage) -> MailFuture<'_> {
        Box::pin(async move {
            tracing::warn!(
                missing = ?self.missing,
                to = %message.to,
                subject = %message.subject,
                "SMTP not configured; notification email skipped"
            );
            Ok(Delivery::Skipped)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "dispatch@example.com".to_string(),
            subject: "New Reservation".to_string(),
            text: "body".to_string(),
            html: "<p>body</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn unconfigured_mailer_skips() {
        let mailer = UnconfiguredMailer::new(vec!["SMTP_HOST"]);
        assert_eq!(mailer.send(message()).await.unwrap(), Delivery::Skipped);
        assert_eq!(mailer.missing(), ["SMTP_HOST"]);
    }

    #[tokio::test]
    async fn console_mailer_reports_sent() {
        assert_eq!(ConsoleMailer.send(message()).await.unwrap(), Delivery::Sent);
    }
}
