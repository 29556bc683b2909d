//! Admin session tokens.
//!
//! A token has the form `{id}.{secret}`. The id locates the session; the
//! secret is compared in constant time, so lookups never leak how much of a
//! guessed token was right.

use crate::error::{AuthError, Result};
use base64::Engine;
use booking_core::environment::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Default session lifetime (7 days).
pub const DEFAULT_TTL: Duration = Duration::days(7);

/// Boxed future returned by registry operations.
pub type TokenFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// An issued admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// Bearer token handed to the client
    pub token: String,
    /// Username the session belongs to
    pub username: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Issues, checks and revokes admin tokens.
pub trait TokenRegistry: Send + Sync {
    /// Issue a fresh token for `username`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Storage`] when the token cannot be recorded.
    fn issue(&self, username: &str) -> TokenFuture<'_, AdminSession>;

    /// Check a presented token.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthorized`] for unknown, malformed, expired or revoked
    /// tokens.
    fn validate<'a>(&'a self, token: &'a str) -> TokenFuture<'a, AdminSession>;

    /// Forget a token. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// [`AuthError::Storage`] when the registry cannot be updated.
    fn revoke<'a>(&'a self, token: &'a str) -> TokenFuture<'a, ()>;
}

struct Entry {
    secret: String,
    username: String,
    expires_at: DateTime<Utc>,
}

/// Process-local token registry. Sessions do not survive a restart.
pub struct InMemoryTokenRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryTokenRegistry {
    /// Registry using the system clock and the given lifetime.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Registry with an injected clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.lock().map_or(0, |mut sessions| {
            let before = sessions.len();
            sessions.retain(|_, entry| entry.expires_at > now);
            before - sessions.len()
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::Storage("token registry lock poisoned".to_string()))
    }
}

impl Default for InMemoryTokenRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

fn random_segment(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl TokenRegistry for InMemoryTokenRegistry {
    fn issue(&self, username: &str) -> TokenFuture<'_, AdminSession> {
        let username = username.to_string();
        Box::pin(async move {
            let id = random_segment(12);
            let secret = random_segment(32);
            let now = self.clock.now();
            let expires_at = now + self.ttl;

            let mut sessions = self.lock()?;
            sessions.retain(|_, entry| entry.expires_at > now);
            sessions.insert(
                id.clone(),
                Entry {
                    secret: secret.clone(),
                    username: username.clone(),
                    expires_at,
                },
            );
            drop(sessions);
            tracing::info!(%username, %expires_at, "admin session issued");

            Ok(AdminSession {
                token: format!("{id}.{secret}"),
                username,
                expires_at,
            })
        })
    }

    fn validate<'a>(&'a self, token: &'a str) -> TokenFuture<'a, AdminSession> {
        Box::pin(async move {
            let (id, secret) = token.split_once('.').ok_or(AuthError::Unauthorized)?;
            let now = self.clock.now();
            let mut sessions = self.lock()?;
            let Some(entry) = sessions.get(id) else {
                return Err(AuthError::Unauthorized);
            };

            // Always run both checks.
            let secret_matches =
                constant_time_eq::constant_time_eq(secret.as_bytes(), entry.secret.as_bytes());
            let is_expired = now >= entry.expires_at;

            if is_expired {
                sessions.remove(id);
                return Err(AuthError::Unauthorized);
            }
            if !secret_matches {
                return Err(AuthError::Unauthorized);
            }

            Ok(AdminSession {
                token: token.to_string(),
                username: entry.username.clone(),
                expires_at: entry.expires_at,
            })
        })
    }

    fn revoke<'a>(&'a self, token: &'a str) -> TokenFuture<'a, ()> {
        Box::pin(async move {
            if let Some((id, secret)) = token.split_once('.') {
                let mut sessions = self.lock()?;
                let matches = sessions.get(id).is_some_and(|entry| {
                    constant_time_eq::constant_time_eq(secret.as_bytes(), entry.secret.as_bytes())
                });
                if matches {
                    sessions.remove(id);
                    tracing::info!("admin session revoked");
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use booking_testing::test_clock;

    #[tokio::test]
    async fn issued_tokens_validate_until_revoked() {
        let registry = InMemoryTokenRegistry::default();
        let session = registry.issue("admin").await.unwrap();

        let checked = registry.validate(&session.token).await.unwrap();
        assert_eq!(checked.username, "admin");

        registry.revoke(&session.token).await.unwrap();
        assert_eq!(
            registry.validate(&session.token).await,
            Err(AuthError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn tokens_are_url_safe_and_distinct() {
        let registry = InMemoryTokenRegistry::default();
        let a = registry.issue("admin").await.unwrap().token;
        let b = registry.issue("admin").await.unwrap().token;
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
    }

    #[tokio::test]
    async fn tampered_or_garbage_tokens_are_rejected() {
        let registry = InMemoryTokenRegistry::default();
        let session = registry.issue("admin").await.unwrap();
        let (id, _) = session.token.split_once('.').unwrap();

        let wrong = format!("{id}.wrong");
        for bad in ["", "nodot", wrong.as_str(), "unknown.secret"] {
            assert_eq!(registry.validate(bad).await, Err(AuthError::Unauthorized), "{bad}");
        }
        // Revoking with the wrong secret leaves the session alone.
        registry.revoke(&wrong).await.unwrap();
        assert!(registry.validate(&session.token).await.is_ok());
    }

    #[tokio::test]
    async fn tokens_expire_after_ttl() {
        let clock = Arc::new(test_clock());
        let registry = InMemoryTokenRegistry::with_clock(Duration::hours(1), clock.clone());
        let session = registry.issue("admin").await.unwrap();

        clock.advance(Duration::minutes(59));
        assert!(registry.validate(&session.token).await.is_ok());

        clock.advance(Duration::minutes(1));
        assert_eq!(
            registry.validate(&session.token).await,
            Err(AuthError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let clock = Arc::new(test_clock());
        let registry = InMemoryTokenRegistry::with_clock(Duration::hours(1), clock.clone());
        registry.issue("admin").await.unwrap();
        clock.advance(Duration::minutes(30));
        let fresh = registry.issue("admin").await.unwrap();
        clock.advance(Duration::minutes(31));

        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.validate(&fresh.token).await.is_ok());
    }

    #[tokio::test]
    async fn issuing_sweeps_abandoned_sessions() {
        let clock = Arc::new(test_clock());
        let registry = InMemoryTokenRegistry::with_clock(Duration::hours(1), clock.clone());
        for _ in 0..100 {
            registry.issue("admin").await.unwrap();
        }
        clock.advance(Duration::hours(2));

        let fresh = registry.issue("admin").await.unwrap();
        assert_eq!(registry.lock().unwrap().len(), 1);
        assert_eq!(registry.purge_expired(), 0);
        assert!(registry.validate(&fresh.token).await.is_ok());
    }
}
