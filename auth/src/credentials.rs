//! Configured admin account.

use crate::error::{AuthError, Result};
use std::fmt;

/// The single back-office account, loaded from configuration.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    /// Create credentials. Surrounding whitespace in the username is ignored.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Configured username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a login attempt.
    ///
    /// Both fields are always compared in constant time, so the response
    /// time does not reveal which one was wrong.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCredentials`] when either value is empty,
    /// [`AuthError::InvalidCredentials`] when they do not match.
    pub fn verify(&self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user_ok = constant_time_eq::constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq::constant_time_eq(password.as_bytes(), self.password.as_bytes());

        if user_ok & pass_ok {
            Ok(())
        } else {
            tracing::warn!(username, "admin login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
