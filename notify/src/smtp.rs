//! SMTP relay using Lettre's async transport.

use booking_core::email::{Delivery, EmailMessage, MailError, MailFuture, Mailer};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use std::time::Duration;

/// Port on which the relay speaks TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

/// Connection settings for an SMTP relay.
#[derive(Clone)]
pub struct SmtpSettings {
    /// Relay host name
    pub host: String,
    /// Relay port (465 for implicit TLS, usually 587 for STARTTLS)
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// Sender address
    pub from: String,
    /// Per-command timeout
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Mailer that delivers through an SMTP relay.
///
/// Port 465 uses implicit TLS; any other port upgrades with STARTTLS. Each
/// SMTP command is bounded by the configured timeout, and the whole send is
/// additionally bounded.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
    timeout: Duration,
}

impl SmtpMailer {
    /// Build a mailer from settings. No connection is made yet.
    ///
    /// # Errors
    ///
    /// [`MailError::InvalidAddress`] when `from` does not parse,
    /// [`MailError::Transport`] when the relay host is unusable.
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let from = parse_mailbox(&settings.from)?;

        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        }
        .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .timeout(Some(settings.timeout))
            .build();

        tracing::info!(
            host = %settings.host,
            port = settings.port,
            implicit_tls = settings.port == IMPLICIT_TLS_PORT,
            "SMTP mailer configured"
        );

        Ok(Self {
            transport,
            from,
            host: settings.host,
            timeout: settings.timeout,
        })
    }

    fn build(&self, message: EmailMessage) -> Result<Message, MailError> {
        Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&message.to)?)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(message.text, message.html))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn classify(err: &lettre::transport::smtp::Error, timeout: Duration) -> MailError {
    if err.is_timeout() {
        return MailError::Timeout(timeout.as_secs());
    }
    match err.status() {
        Some(code) => MailError::Rejected {
            code: code.to_string().parse().unwrap_or_default(),
            message: err.to_string(),
        },
        None => MailError::Transport(err.to_string()),
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: EmailMessage) -> MailFuture<'_> {
        Box::pin(async move {
            let to = message.to.clone();
            let email = self.build(message)?;

            // Connect, TLS, auth and DATA each get their own timeout inside
            // the transport; this bounds the sum.
            let overall = self.timeout * 3;
            match tokio::time::timeout(overall, self.transport.send(email)).await {
                Ok(Ok(_response)) => {
                    tracing::debug!(host = %self.host, %to, "SMTP relay accepted message");
                    Ok(Delivery::Sent)
                }
                Ok(Err(e)) => {
                    let err = classify(&e, self.timeout);
                    tracing::warn!(host = %self.host, %to, error = %err, "SMTP send failed");
                    Err(err)
                }
                Err(_) => {
                    tracing::warn!(host = %self.host, %to, "SMTP send timed out");
                    Err(MailError::Timeout(overall.as_secs()))
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn settings(port: u16) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port,
            username: "mailer".to_string(),
            password: "hunter2".to_string(),
            from: "no-reply@transportbooking.local".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn builds_for_both_tls_modes() {
        assert!(SmtpMailer::new(settings(465)).is_ok());
        assert!(SmtpMailer::new(settings(587)).is_ok());
    }

    #[test]
    fn rejects_bad_sender() {
        let mut bad = settings(587);
        bad.from = "not an address".to_string();
        assert!(matches!(SmtpMailer::new(bad), Err(MailError::InvalidAddress { .. })));
    }

    #[test]
    fn settings_debug_hides_password() {
        assert!(!format!("{:?}", settings(587)).contains("hunter2"));
    }

    #[tokio::test]
    async fn bad_recipient_fails_before_connecting() {
        let mailer = SmtpMailer::new(settings(587)).unwrap();
        let message = EmailMessage {
            to: "nobody".to_string(),
            subject: "s".to_string(),
            text: "t".to_string(),
            html: "<p>h</p>".to_string(),
        };
        assert!(matches!(
            mailer.send(message).await,
            Err(MailError::InvalidAddress { .. })
        ));
    }
}
