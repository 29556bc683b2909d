//! Axum glue for the booking service.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          HTTP shell (Axum)              │  ← JSON, cookies, WebSocket
//! │  - AppError, extractors, middleware     │  ← correlation ids, admin gate
//! ├─────────────────────────────────────────┤
//! │          booking-core                   │
//! │  - intake pipeline, admin operations    │  ← no HTTP types
//! └─────────────────────────────────────────┘
//! ```
//!
//! Routes themselves live in `booking-server`; this crate holds the pieces
//! every route uses.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{CorrelationId, RequireAdmin, presented_token};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
