//! # Booking Core
//!
//! Domain types and the reservation intake pipeline for the transport
//! booking service.
//!
//! The pipeline turns a raw public submission into a durable reservation and
//! then notifies the back office:
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌─────────┐   ┌──────────────────────┐
//! │ Validate │──>│  Resolve  │──>│ Persist │──>│ Notify (best effort) │
//! │  fields  │   │ catalog   │   │  store  │   │ fan-out, then email  │
//! └──────────┘   └───────────┘   └─────────┘   └──────────────────────┘
//!      │               │              │
//!      ▼               ▼              ▼
//!  400 + fields   400 generic      500 generic
//! ```
//!
//! Every external system the pipeline touches is a capability trait that the
//! caller injects:
//!
//! - [`catalog::Catalog`]: read-only service type / vehicle lookups
//! - [`store::ReservationStore`]: reservation persistence
//! - [`broadcast::BroadcastSink`]: live fan-out to connected admin viewers
//! - [`email::Mailer`]: transactional email relay
//!
//! Concrete implementations live in `booking-postgres`, `booking-notify`
//! and `booking-testing`.

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admin;
pub mod broadcast;
pub mod catalog;
pub mod email;
pub mod environment;
pub mod intake;
pub mod pickup;
pub mod resolver;
pub mod seed;
pub mod store;
pub mod types;
pub mod validation;

pub use broadcast::{BroadcastSink, Broadcaster};
pub use catalog::{Catalog, CatalogAdmin};
pub use email::{EmailMessage, Mailer};
pub use intake::{IntakeError, ReservationIntake};
pub use store::ReservationStore;
pub use types::{
    CatalogId, NewReservation, NotificationEvent, Reservation, ReservationId, ReservationStatus,
    ServiceType, VehiclePreference,
};
pub use validation::ValidationErrors;
