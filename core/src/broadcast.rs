//! Live fan-out of new reservations to connected admin viewers.
//!
//! Delivery is at-most-once per connected viewer: there is no queue and no
//! replay, and a viewer that connects later never sees earlier events.

use crate::types::NotificationEvent;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a broadcaster.
#[derive(Error, Debug)]
pub enum BroadcastError {
    /// The payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The underlying channel is gone.
    #[error("Broadcast channel closed")]
    Closed,
}

/// Something that can push a named event to every connected viewer.
pub trait Broadcaster: Send + Sync {
    /// Push `payload` under `event` to every current subscriber.
    ///
    /// Returns how many subscribers received it. Zero subscribers is not an
    /// error.
    ///
    /// # Errors
    ///
    /// [`BroadcastError`] when the event cannot be sent at all.
    fn emit(&self, event: &str, payload: Value) -> Result<usize, BroadcastError>;

    /// Number of currently connected subscribers.
    fn subscriber_count(&self) -> usize;
}

/// Result of one fan-out attempt, for logs and the notification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// No broadcaster is configured
    NoSink,
    /// Sent to this many viewers (possibly zero)
    Delivered(usize),
    /// The broadcaster reported an error
    Failed,
}

/// Broadcast capability as injected into the intake pipeline.
///
/// Absence is an explicit state rather than a missing global.
#[derive(Clone, Default)]
pub enum BroadcastSink {
    /// Fan-out is disabled
    #[default]
    None,
    /// Fan-out goes through this broadcaster
    Active(Arc<dyn Broadcaster>),
}

impl BroadcastSink {
    /// Wrap a broadcaster.
    #[must_use]
    pub fn active(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self::Active(broadcaster)
    }

    /// Publish a `reservation:new` event. Never fails; problems are logged.
    #[must_use]
    pub fn publish(&self, event: &NotificationEvent) -> FanOut {
        let Self::Active(broadcaster) = self else {
            tracing::warn!(reservation_id = %event.id, "no broadcaster configured, skipping fan-out");
            return FanOut::NoSink;
        };

        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(reservation_id = %event.id, error = %e, "failed to encode notification event");
                return FanOut::Failed;
            }
        };

        match broadcaster.emit(NotificationEvent::NAME, payload) {
            Ok(receivers) => {
                tracing::debug!(reservation_id = %event.id, receivers, "reservation broadcast");
                FanOut::Delivered(receivers)
            }
            Err(e) => {
                tracing::error!(reservation_id = %event.id, error = %e, "reservation broadcast failed");
                FanOut::Failed
            }
        }
    }
}

impl std::fmt::Debug for BroadcastSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("BroadcastSink::None"),
            Self::Active(b) => f
                .debug_struct("BroadcastSink::Active")
                .field("subscribers", &b.subscriber_count())
                .finish(),
        }
    }
}
