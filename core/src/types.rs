//! Domain types for the booking service.
//!
//! Reservations reference two kinds of catalog entries (service types and
//! vehicle preferences). Identifiers are opaque UUIDs assigned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a reservation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random `ReservationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ReservationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse an identifier received over the wire.
    ///
    /// Returns `None` for anything that is not a UUID; callers treat that the
    /// same as an identifier that does not exist.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a catalog entry (service type or vehicle preference)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(Uuid);

impl CatalogId {
    /// Creates a new random `CatalogId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CatalogId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse an identifier received over the wire.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for CatalogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Reservation status
// ============================================================================

/// Back-office handling status of a reservation.
///
/// Transitions are unconstrained: any value may follow any other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Just submitted, nobody has looked at it yet
    #[default]
    New,
    /// The customer has been contacted
    Contacted,
    /// The ride is confirmed
    Confirmed,
    /// The reservation was cancelled
    Cancelled,
}

impl ReservationStatus {
    /// Every accepted status, in display order.
    pub const ALL: [Self; 4] = [Self::New, Self::Contacted, Self::Confirmed, Self::Cancelled];

    /// Wire representation (`NEW`, `CONTACTED`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Contacted => "CONTACTED",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is not one of the four accepted values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ReservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// ============================================================================
// Catalog entries
// ============================================================================

/// A kind of service offered (airport transfer, hourly charter, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceType {
    /// Identifier
    pub id: CatalogId,
    /// Unique display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A vehicle class a customer can ask for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePreference {
    /// Identifier
    pub id: CatalogId,
    /// Unique display name
    pub name: String,
    /// Marketing category ("Business Class", ...)
    pub category: String,
    /// Image URL
    pub image: String,
    /// Passenger capacity
    pub passengers: u32,
    /// Luggage capacity
    pub luggage: u32,
    /// Free-text description
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Attributes of a vehicle preference as written by the back office.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDraft {
    /// Unique display name
    pub name: String,
    /// Marketing category
    pub category: String,
    /// Image URL
    pub image: String,
    /// Passenger capacity
    pub passengers: u32,
    /// Luggage capacity
    pub luggage: u32,
    /// Free-text description
    pub description: String,
}

// ============================================================================
// Reservations
// ============================================================================

/// Customer contact details captured by the booking form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
}

/// A fully validated reservation request, ready to be persisted.
///
/// There is deliberately no status field: the store always starts a
/// reservation as [`ReservationStatus::New`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewReservation {
    /// Who is booking
    pub customer: Customer,
    /// Requested service type (not yet proven to exist)
    pub service_type_id: String,
    /// Requested vehicle preference (not yet proven to exist)
    pub vehicle_preference_id: String,
    /// Passenger count, 1..=50
    pub passengers: u8,
    /// Bag count, 0..=50
    pub bags: u8,
    /// Pickup instant (local date and time converted to UTC)
    pub pickup_at: DateTime<Utc>,
    /// Pickup address
    pub pickup_address: String,
    /// Destination address
    pub destination_address: String,
    /// Airline, when the pickup is a flight arrival
    pub airline: Option<String>,
    /// Flight number
    pub flight_number: Option<String>,
    /// Free-text note
    pub message: Option<String>,
}

/// Reservation payload whose catalog references have been resolved.
///
/// This is the only shape a [`crate::store::ReservationStore`] accepts, so a
/// reservation with dangling references cannot be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedReservation {
    /// Validated request
    pub request: NewReservation,
    /// Resolved service type id
    pub service_type_id: CatalogId,
    /// Resolved vehicle preference id
    pub vehicle_preference_id: CatalogId,
}

/// A persisted reservation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Store-assigned identifier
    pub id: ReservationId,
    /// Current handling status
    pub status: ReservationStatus,
    /// Store-assigned creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Customer name
    pub name: String,
    /// Customer email
    pub email: String,
    /// Customer phone
    pub phone: String,
    /// Referenced service type
    pub service_type_id: CatalogId,
    /// Referenced vehicle preference
    pub vehicle_preference_id: CatalogId,
    /// Passenger count
    pub passengers: u8,
    /// Bag count
    pub bags: u8,
    /// Pickup instant
    pub pickup_at: DateTime<Utc>,
    /// Pickup address
    pub pickup_address: String,
    /// Destination address
    pub destination_address: String,
    /// Airline
    pub airline: Option<String>,
    /// Flight number
    pub flight_number: Option<String>,
    /// Free-text note
    pub message: Option<String>,
}

/// Ephemeral projection of a just-created reservation.
///
/// Pushed to connected admin viewers as `reservation:new` and used as the
/// source of the notification email. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    /// Reservation identifier
    pub id: ReservationId,
    /// Creation timestamp (ISO-8601 on the wire)
    pub created_at: DateTime<Utc>,
    /// Customer name
    pub name: String,
    /// Customer email
    pub email: String,
    /// Customer phone
    pub phone: String,
    /// Resolved service type display name
    pub service_type: String,
    /// Resolved vehicle preference display name
    pub vehicle_preference: String,
    /// Pickup instant (ISO-8601 on the wire)
    pub pickup_at: DateTime<Utc>,
    /// Pickup address
    pub pickup_address: String,
    /// Destination address
    pub destination_address: String,
}

impl NotificationEvent {
    /// Event name used on the viewer channel.
    pub const NAME: &'static str = "reservation:new";

    /// Project a persisted reservation together with its resolved names.
    #[must_use]
    pub fn from_reservation(
        reservation: &Reservation,
        service_type: impl Into<String>,
        vehicle_preference: impl Into<String>,
    ) -> Self {
        Self {
            id: reservation.id,
            created_at: reservation.created_at,
            name: reservation.name.clone(),
            email: reservation.email.clone(),
            phone: reservation.phone.clone(),
            service_type: service_type.into(),
            vehicle_preference: vehicle_preference.into(),
            pickup_at: reservation.pickup_at,
            pickup_address: reservation.pickup_address.clone(),
            destination_address: reservation.destination_address.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_form() {
        for status in ReservationStatus::ALL {
            assert_eq!(status.as_str().parse::<ReservationStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert_eq!(
            "DONE".parse::<ReservationStatus>(),
            Err(UnknownStatus("DONE".to_string()))
        );
        // Case matters on the wire.
        assert!("new".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn status_serializes_screaming_case() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).ok();
        assert_eq!(json.as_deref(), Some("\"CANCELLED\""));
    }

    #[test]
    fn default_status_is_new() {
        assert_eq!(ReservationStatus::default(), ReservationStatus::New);
    }

    #[test]
    fn ids_reject_non_uuid_input() {
        assert!(CatalogId::parse("not-an-id").is_none());
        assert!(ReservationId::parse("").is_none());
        let id = CatalogId::new();
        assert_eq!(CatalogId::parse(&id.to_string()), Some(id));
    }
}
