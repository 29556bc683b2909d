//! Notification doubles.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use booking_core::broadcast::{BroadcastError, Broadcaster};
use booking_core::email::{Delivery, EmailMessage, MailError, MailFuture, Mailer};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Mailer that accepts every message and keeps a copy.
#[derive(Clone, Debug, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingMailer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: EmailMessage) -> MailFuture<'_> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(message);
            Ok(Delivery::Sent)
        })
    }
}

/// Mailer whose relay always refuses.
#[derive(Clone, Debug)]
pub struct FailingMailer {
    code: u16,
    attempts: Arc<Mutex<usize>>,
}

impl FailingMailer {
    /// Reject every message with SMTP code 550.
    #[must_use]
    pub fn new() -> Self {
        Self::with_code(550)
    }

    /// Reject every message with the given SMTP code.
    #[must_use]
    pub fn with_code(code: u16) -> Self {
        Self {
            code,
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    /// How many sends were attempted.
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl Default for FailingMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailer for FailingMailer {
    fn send(&self, _message: EmailMessage) -> MailFuture<'_> {
        Box::pin(async move {
            *self.attempts.lock().unwrap() += 1;
            Err(MailError::Rejected {
                code: self.code,
                message: "mailbox unavailable".to_string(),
            })
        })
    }
}

/// Broadcaster that records every emitted event.
///
/// Reports a configurable number of receivers.
#[derive(Clone, Debug, Default)]
pub struct RecordingBroadcaster {
    events: Arc<Mutex<Vec<(String, Value)>>>,
    subscribers: usize,
}

impl RecordingBroadcaster {
    /// Recorder reporting `subscribers` connected viewers.
    #[must_use]
    pub fn new(subscribers: usize) -> Self {
        Self {
            events: Arc::default(),
            subscribers,
        }
    }

    /// Events emitted so far as `(name, payload)`.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn emit(&self, event: &str, payload: Value) -> Result<usize, BroadcastError> {
        self.events.lock().unwrap().push((event.to_string(), payload));
        Ok(self.subscribers)
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers
    }
}

/// Broadcaster whose channel is always closed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingBroadcaster;

impl Broadcaster for FailingBroadcaster {
    fn emit(&self, _event: &str, _payload: Value) -> Result<usize, BroadcastError> {
        Err(BroadcastError::Closed)
    }

    fn subscriber_count(&self) -> usize {
        0
    }
}
