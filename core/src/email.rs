//! Notification email composition and the mail relay capability.

use crate::types::NotificationEvent;
use chrono::{DateTime, Local, Utc};
use std::fmt::Write as _;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors a mail relay can report.
///
/// None of the variants carry relay credentials.
#[derive(Error, Debug)]
pub enum MailError {
    /// Sender or recipient address could not be parsed.
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress {
        /// The offending address
        address: String,
        /// Parser message
        reason: String,
    },

    /// The message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The relay answered with a permanent or transient error code.
    #[error("Relay rejected message with code {code}: {message}")]
    Rejected {
        /// SMTP reply code
        code: u16,
        /// Relay message
        message: String,
    },

    /// The relay did not answer in time.
    #[error("Mail relay timed out after {0}s")]
    Timeout(u64),

    /// Connection or protocol failure.
    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// What happened to a message handed to a [`Mailer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The relay accepted the message
    Sent,
    /// No relay is configured; the message was dropped on purpose
    Skipped,
}

/// Boxed future returned by [`Mailer::send`].
pub type MailFuture<'a> = Pin<Box<dyn Future<Output = Result<Delivery, MailError>> + Send + 'a>>;

/// Transactional mail relay.
///
/// # Implementations
///
/// - `SmtpMailer` (in `booking-notify`): real SMTP delivery
/// - `UnconfiguredMailer` / `ConsoleMailer` (in `booking-notify`): log only
/// - `RecordingMailer` / `FailingMailer` (in `booking-testing`)
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// [`MailError`] when the relay fails. Callers log and drop it.
    fn send(&self, message: EmailMessage) -> MailFuture<'_>;
}

/// A composed message, independent of any relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// HTML body
    pub html: String,
}

impl EmailMessage {
    /// Compose the back-office notification for a new reservation.
    ///
    /// The pickup instant is rendered in the server's local time zone.
    #[must_use]
    pub fn new_reservation(to: impl Into<String>, event: &NotificationEvent) -> Self {
        let pickup = format_pickup(event.pickup_at);
        let subject = format!("New Reservation: {} - {}", event.name, event.service_type);

        let rows = [
            ("Reservation ID", event.id.to_string()),
            ("Name", event.name.clone()),
            ("Email", event.email.clone()),
            ("Phone", event.phone.clone()),
            ("Service Type", event.service_type.clone()),
            ("Vehicle Preference", event.vehicle_preference.clone()),
            ("Pickup Date/Time", pickup.clone()),
            ("Pickup Address", event.pickup_address.clone()),
            ("Destination", event.destination_address.clone()),
        ];

        let text = [
            "New reservation received".to_string(),
            String::new(),
            format!("Reservation ID: {}", event.id),
            format!("Name: {}", event.name),
            format!("Email: {}", event.email),
            format!("Phone: {}", event.phone),
            format!("Service: {}", event.service_type),
            format!("Vehicle: {}", event.vehicle_preference),
            format!("Pickup: {pickup}"),
            format!("Pickup Address: {}", event.pickup_address),
            format!("Destination: {}", event.destination_address),
        ]
        .join("\n");

        let mut details = String::new();
        for (label, value) in &rows {
            let _ = writeln!(
                details,
                "      <p><strong>{label}:</strong> {}</p>",
                escape_html(value)
            );
        }
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #D4AF37;">New Reservation Received</h2>
  <div style="background: #f5f5f5; padding: 20px; border-radius: 8px; margin: 20px 0;">
{details}  </div>
  <p style="color: #666; font-size: 12px;">Please check the admin panel for more details.</p>
</div>
"#
        );

        Self {
            to: to.into(),
            subject,
            text,
            html,
        }
    }
}

fn format_pickup(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%a, %b %-d, %Y %-I:%M %p")
        .to_string()
}

/// Escape text for inclusion in an HTML body.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
