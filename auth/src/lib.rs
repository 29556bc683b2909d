//! # Booking Auth
//!
//! Gate for the back-office API.
//!
//! - [`AdminCredentials`]: the configured admin account
//! - [`TokenRegistry`]: issues and checks session tokens; the in-memory
//!   [`InMemoryTokenRegistry`] is the default implementation
//!
//! Clients present a token either in the [`ADMIN_COOKIE`] cookie or as an
//! `Authorization: Bearer` header.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod credentials;
pub mod error;
pub mod tokens;

pub use credentials::AdminCredentials;
pub use error::{AuthError, Result};
pub use tokens::{AdminSession, DEFAULT_TTL, InMemoryTokenRegistry, TokenRegistry};

/// Cookie carrying the admin token.
pub const ADMIN_COOKIE: &str = "tb_admin";
