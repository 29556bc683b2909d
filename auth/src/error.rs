//! Error types for admin authentication.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of the admin gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password missing from the login request.
    #[error("Username and password are required")]
    MissingCredentials,

    /// Username or password did not match.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No admin account is configured on this server.
    #[error("Admin login is not configured")]
    NotConfigured,

    /// Request carried no token, or an unknown, expired or revoked one.
    #[error("Unauthorized")]
    Unauthorized,

    /// Token storage failed.
    #[error("Token storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// True for errors caused by the caller.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::NotConfigured)
    }
}
