//! # Booking Testing
//!
//! In-memory capabilities and fixtures for testing the booking service.
//!
//! This crate provides:
//! - [`InMemoryReservationStore`] and [`InMemoryCatalog`]: `HashMap`/`Vec`
//!   backed storage with switchable failures
//! - [`RecordingMailer`], [`FailingMailer`], [`RecordingBroadcaster`] and
//!   [`FailingBroadcaster`]: notification doubles
//! - [`FixedClock`] for deterministic timestamps
//! - [`fixtures`]: valid submissions and a pre-populated catalog
//!
//! ## Example
//!
//! ```ignore
//! use booking_testing::{fixtures, InMemoryReservationStore, RecordingMailer};
//!
//! #[tokio::test]
//! async fn accepts_a_booking() {
//!     let (catalog, service, vehicle) = fixtures::catalog();
//!     let store = InMemoryReservationStore::new();
//!     let intake = fixtures::intake(&catalog, &store, BroadcastSink::None, RecordingMailer::new());
//!
//!     let accepted = intake.submit(&fixtures::submission(&service, &vehicle)).await.unwrap();
//!     assert_eq!(store.len(), 1);
//! }
//! ```

use booking_core::environment::Clock;
use chrono::{DateTime, Utc};

mod notify_mocks;
mod store_mocks;

pub mod fixtures;

pub use notify_mocks::{FailingBroadcaster, FailingMailer, RecordingBroadcaster, RecordingMailer};
pub use store_mocks::{InMemoryCatalog, InMemoryReservationStore};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::RwLock;

    /// Clock that only moves when told to.
    ///
    /// # Example
    ///
    /// ```
    /// use booking_testing::mocks::FixedClock;
    /// use booking_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let t1 = clock.now();
    /// assert_eq!(t1, clock.now());
    /// clock.advance(Duration::seconds(5));
    /// assert_eq!(clock.now() - t1, Duration::seconds(5));
    /// ```
    #[derive(Debug)]
    pub struct FixedClock {
        time: RwLock<DateTime<Utc>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: RwLock::new(time),
            }
        }

        /// Move the clock forward.
        #[allow(clippy::unwrap_used)]
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.write().unwrap();
            *time += by;
        }
    }

    impl Clock for FixedClock {
        #[allow(clippy::unwrap_used)]
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use mocks::{FixedClock, test_clock};

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honours `RUST_LOG`; output is captured by the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
