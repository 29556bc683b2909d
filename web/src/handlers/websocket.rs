//! WebSocket endpoint for admin viewers.
//!
//! ```text
//! Intake task        BroadcastHub           Viewer socket
//!     │                   │                      │
//!     │                   │<── subscribe() ──────┤  (upgrade)
//!     ├─ emit() ─────────>│                      │
//!     │                   ├── event frame ──────>│
//!     │                   ├── ping (30s) ───────>│
//! ```
//!
//! **Server → Client:**
//! ```json
//! { "type": "event", "event": "reservation:new", "data": { ... } }
//! ```
//!
//! Client messages are read only to notice a close.

use crate::error::AppError;
use crate::extractors::RequireAdmin;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use booking_notify::{BroadcastHub, HubEvent, Viewer, ViewerEvent};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Keep-alive ping interval.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Frame<'a> {
    Event { event: &'a str, data: &'a Value },
}

fn encode(event: &HubEvent) -> serde_json::Result<String> {
    serde_json::to_string(&Frame::Event {
        event: &event.event,
        data: &event.data,
    })
}

/// `GET /api/admin/ws`.
///
/// The viewer slot is taken before the upgrade, so a full hub answers 503
/// instead of accepting a socket it cannot serve.
///
/// # Errors
///
/// 401 without a valid admin token, 503 when the viewer cap is reached.
pub async fn viewer(
    RequireAdmin(session): RequireAdmin,
    State(hub): State<Arc<BroadcastHub>>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let viewer = hub.subscribe().map_err(|full| {
        warn!(username = %session.username, error = %full, "viewer rejected");
        AppError::unavailable("Too many live viewers")
    })?;

    info!(username = %session.username, viewers = hub.viewer_count(), "viewer connected");
    Ok(ws.on_upgrade(move |socket| run_viewer(socket, viewer, session.username)))
}

async fn run_viewer(socket: WebSocket, mut viewer: Viewer, username: String) {
    metrics::gauge!("booking.viewers.connected").increment(1.0);
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ping.tick().await;

        loop {
            let message = tokio::select! {
                next = viewer.next() => match next {
                    ViewerEvent::Event(event) => match encode(&event) {
                        Ok(text) => Message::Text(text),
                        Err(e) => {
                            warn!(error = %e, event = %event.event, "failed to encode event");
                            continue;
                        }
                    },
                    ViewerEvent::Lagged(skipped) => {
                        warn!(skipped, "viewer fell behind; events skipped");
                        continue;
                    }
                    ViewerEvent::Closed => break,
                },
                _ = ping.tick() => Message::Ping(Vec::new()),
            };

            if sender.send(message).await.is_err() {
                break;
            }
        }
        debug!("viewer send task finished");
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
        debug!("viewer receive task finished");
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    metrics::gauge!("booking.viewers.connected").decrement(1.0);
    info!(%username, "viewer disconnected");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_frame_shape() {
        let event = HubEvent {
            event: "reservation:new".to_string(),
            data: json!({ "reservationId": "r1", "name": "Ada" }),
        };
        let frame: Value = serde_json::from_str(&encode(&event).unwrap()).unwrap();
        assert_eq!(
            frame,
            json!({
                "type": "event",
                "event": "reservation:new",
                "data": { "reservationId": "r1", "name": "Ada" }
            })
        );
    }
}
