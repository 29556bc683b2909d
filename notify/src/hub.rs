//! In-process broadcast hub for admin viewers.
//!
//! ```text
//! intake task ──emit()──> broadcast::Sender<HubEvent>
//!                              │
//!                ┌─────────────┼─────────────┐
//!                ▼             ▼             ▼
//!             viewer 1      viewer 2      viewer N   (≤ max_viewers)
//! ```
//!
//! Events are not queued for absent viewers and never replayed.

use booking_core::broadcast::{BroadcastError, Broadcaster};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;

/// Default per-viewer buffer before a slow viewer starts skipping events.
pub const DEFAULT_CAPACITY: usize = 64;

/// Default cap on concurrent viewers.
pub const DEFAULT_MAX_VIEWERS: usize = 32;

/// One named event as seen by every viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubEvent {
    /// Event name (`reservation:new`)
    pub event: String,
    /// JSON payload
    pub data: Value,
}

/// Returned when the viewer cap is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("viewer limit of {0} reached")]
pub struct HubFull(pub usize);

/// Fan-out hub backed by a `tokio::sync::broadcast` channel.
#[derive(Debug)]
pub struct BroadcastHub {
    sender: broadcast::Sender<HubEvent>,
    viewers: AtomicUsize,
    max_viewers: usize,
}

impl BroadcastHub {
    /// Hub with the given per-viewer buffer and viewer cap.
    #[must_use]
    pub fn new(capacity: usize, max_viewers: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            sender,
            viewers: AtomicUsize::new(0),
            max_viewers,
        })
    }

    /// Register a viewer.
    ///
    /// The viewer only sees events emitted after this call.
    ///
    /// # Errors
    ///
    /// [`HubFull`] when `max_viewers` viewers are already connected.
    pub fn subscribe(self: &Arc<Self>) -> Result<Viewer, HubFull> {
        self.viewers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_viewers).then_some(n + 1)
            })
            .map_err(|_| HubFull(self.max_viewers))?;

        Ok(Viewer {
            receiver: self.sender.subscribe(),
            hub: Arc::clone(self),
        })
    }

    /// Viewers currently registered.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::Acquire)
    }
}

impl Broadcaster for BroadcastHub {
    fn emit(&self, event: &str, payload: Value) -> Result<usize, BroadcastError> {
        let message = HubEvent {
            event: event.to_string(),
            data: payload,
        };
        // A send error only means nobody is listening.
        Ok(self.sender.send(message).unwrap_or(0))
    }

    fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A registered viewer. Dropping it frees its slot.
#[derive(Debug)]
pub struct Viewer {
    receiver: broadcast::Receiver<HubEvent>,
    hub: Arc<BroadcastHub>,
}

/// What a viewer gets from [`Viewer::next`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// A new event
    Event(HubEvent),
    /// The viewer fell behind and this many events were dropped
    Lagged(u64),
    /// The hub is gone
    Closed,
}

impl Viewer {
    /// Wait for the next event.
    pub async fn next(&mut self) -> ViewerEvent {
        match self.receiver.recv().await {
            Ok(event) => ViewerEvent::Event(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => ViewerEvent::Lagged(skipped),
            Err(broadcast::error::RecvError::Closed) => ViewerEvent::Closed,
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.hub.viewers.fetch_sub(1, Ordering::AcqRel);
    }
}
