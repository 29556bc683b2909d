//! Environment abstractions shared by the store implementations.

use chrono::{DateTime, Utc};

/// Clock trait - abstracts time operations for testability.
///
/// Stores use it to stamp `created_at` / `updated_at`, so those values are
/// never taken from client input.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
