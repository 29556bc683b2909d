//! # Booking Server
//!
//! HTTP surface of the transport booking service: the public booking form
//! API, the back-office API and the live viewer socket.
//!
//! - [`config`]: environment configuration
//! - [`state`]: shared application state
//! - [`api`]: request handlers
//! - [`routes`]: the router
//! - [`bootstrap`]: production wiring against `PostgreSQL`
//! - [`uploads`]: vehicle image storage

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod routes;
pub mod state;
pub mod uploads;

pub use config::Config;
pub use routes::build_router;
pub use state::{AdminGate, AppState};
pub use uploads::UploadDir;
