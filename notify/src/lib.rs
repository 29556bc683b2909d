//! # Booking Notify
//!
//! Delivery side of reservation notifications.
//!
//! - [`BroadcastHub`]: live fan-out to connected admin viewers
//! - [`SmtpMailer`]: email through an SMTP relay
//! - [`ConsoleMailer`] and [`UnconfiguredMailer`]: local and degraded modes
//!
//! [`build_mailer`] picks the mailer from [`MailSettings`].

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod fallback;
pub mod hub;
pub mod smtp;

pub use fallback::{ConsoleMailer, UnconfiguredMailer};
pub use hub::{BroadcastHub, HubEvent, HubFull, Viewer, ViewerEvent};
pub use smtp::{SmtpMailer, SmtpSettings};

use booking_core::email::{MailError, Mailer};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// How notification email leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailMode {
    /// Deliver through SMTP when configured
    #[default]
    Smtp,
    /// Log messages instead of sending them
    Console,
}

impl FromStr for MailMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "console" => Ok(Self::Console),
            other => Err(format!("unknown mail mode {other:?} (expected smtp or console)")),
        }
    }
}

/// Raw mail configuration. Optional fields may be absent.
#[derive(Clone, Default)]
pub struct MailSettings {
    /// Delivery mode
    pub mode: MailMode,
    /// `SMTP_HOST`
    pub host: Option<String>,
    /// `SMTP_PORT`
    pub port: u16,
    /// `SMTP_USER`
    pub username: Option<String>,
    /// `SMTP_PASS`
    pub password: Option<String>,
    /// `SMTP_FROM`
    pub from: String,
    /// Per-command timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("mode", &self.mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl MailSettings {
    /// Names of the SMTP settings that are absent or blank.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        [
            ("SMTP_HOST", blank(&self.host)),
            ("SMTP_USER", blank(&self.username)),
            ("SMTP_PASS", blank(&self.password)),
        ]
        .into_iter()
        .filter_map(|(name, is_blank)| is_blank.then_some(name))
        .collect()
    }
}

/// Choose a mailer for the given settings.
///
/// Console mode always logs. SMTP mode with missing settings degrades to
/// [`UnconfiguredMailer`] rather than failing startup.
///
/// # Errors
///
/// [`MailError`] when SMTP settings are present but unusable (bad sender
/// address or relay host).
pub fn build_mailer(settings: MailSettings) -> Result<Arc<dyn Mailer>, MailError> {
    if settings.mode == MailMode::Console {
        tracing::info!("mail mode is console; emails will be logged");
        return Ok(Arc::new(ConsoleMailer));
    }

    let missing = settings.missing();
    if !missing.is_empty() {
        tracing::warn!(?missing, "SMTP not configured; emails will be skipped");
        return Ok(Arc::new(UnconfiguredMailer::new(missing)));
    }

    let mailer = SmtpMailer::new(SmtpSettings {
        host: settings.host.unwrap_or_default(),
        port: settings.port,
        username: settings.username.unwrap_or_default(),
        password: settings.password.unwrap_or_default(),
        from: settings.from,
        timeout: settings.timeout,
    })?;
    Ok(Arc::new(mailer))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use booking_core::email::{Delivery, EmailMessage};

    fn complete() -> MailSettings {
        MailSettings {
            mode: MailMode::Smtp,
            host: Some("smtp.example.com".to_string()),
            port: 587,
            username: Some("mailer".to_string()),
            password: Some("pw".to_string()),
            from: "no-reply@transportbooking.local".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn reports_each_missing_setting() {
        let settings = MailSettings {
            host: Some("  ".to_string()),
            password: None,
            ..complete()
        };
        assert_eq!(settings.missing(), vec!["SMTP_HOST", "SMTP_PASS"]);
        assert!(complete().missing().is_empty());
    }

    #[tokio::test]
    async fn missing_settings_yield_skipping_mailer() {
        let mailer = build_mailer(MailSettings {
            username: None,
            ..complete()
        })
        .unwrap();
        let message = EmailMessage {
            to: "dispatch@example.com".to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
            html: "h".to_string(),
        };
        assert_eq!(mailer.send(message).await.unwrap(), Delivery::Skipped);
    }

    #[test]
    fn complete_settings_build_smtp_mailer() {
        assert!(build_mailer(complete()).is_ok());
    }

    #[test]
    fn parses_mail_mode() {
        assert_eq!("Console".parse::<MailMode>().unwrap(), MailMode::Console);
        assert_eq!("smtp".parse::<MailMode>().unwrap(), MailMode::Smtp);
        assert!("pigeon".parse::<MailMode>().is_err());
    }
}
