//! Reservation persistence.
//!
//! # Implementations
//!
//! - `PgReservationStore` (in `booking-postgres`): production storage
//! - `InMemoryReservationStore` (in `booking-testing`): fast, deterministic tests

use crate::types::{Reservation, ReservationId, ReservationStatus, ResolvedReservation};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Upper bound on a single listing page.
pub const MAX_PAGE_SIZE: usize = 100;

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back to a reservation.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Durable reservation storage.
///
/// The store owns `id`, `status`, `created_at` and `updated_at`: a created
/// reservation always starts as [`ReservationStatus::New`] with timestamps
/// from the store's clock.
pub trait ReservationStore: Send + Sync {
    /// Persist a resolved reservation and return the stored record.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the write fails. Nothing is persisted in that case.
    fn create(&self, reservation: ResolvedReservation) -> StoreFuture<'_, Reservation>;

    /// Fetch one reservation.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the read fails.
    fn get(&self, id: ReservationId) -> StoreFuture<'_, Option<Reservation>>;

    /// The newest reservations, newest first.
    ///
    /// `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the read fails.
    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Reservation>>;

    /// Change a reservation's status. Returns `false` when the id is unknown.
    ///
    /// # Errors
    ///
    /// [`StoreError`] when the write fails.
    fn update_status(&self, id: ReservationId, status: ReservationStatus)
    -> StoreFuture<'_, bool>;
}

/// Clamp a requested page size into the accepted range.
#[must_use]
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(25), 25);
        assert_eq!(clamp_limit(10_000), MAX_PAGE_SIZE);
    }
}
