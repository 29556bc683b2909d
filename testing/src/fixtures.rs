//! Ready-made test data.

use crate::store_mocks::{InMemoryCatalog, InMemoryReservationStore};
use booking_core::broadcast::BroadcastSink;
use booking_core::email::Mailer;
use booking_core::intake::ReservationIntake;
use booking_core::types::{ServiceType, VehiclePreference};
use serde_json::{Value, json};
use std::sync::Arc;

/// Address the notification email goes to in tests.
pub const ADMIN_EMAIL: &str = "dispatch@example.com";

/// Catalog holding one service type and one vehicle.
#[must_use]
pub fn catalog() -> (InMemoryCatalog, ServiceType, VehiclePreference) {
    let catalog = InMemoryCatalog::new();
    let service = catalog.add_service_type("Airport Transfer");
    let vehicle = catalog.add_vehicle("Luxury SUV");
    (catalog, service, vehicle)
}

/// A submission that passes validation and references the given entries.
#[must_use]
pub fn submission(service: &ServiceType, vehicle: &VehiclePreference) -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "phone": "4165551234",
        "serviceTypeId": service.id.to_string(),
        "vehiclePreferenceId": vehicle.id.to_string(),
        "passengers": 2,
        "bags": 1,
        "pickupDate": "2025-03-10",
        "pickupTime": "09:00",
        "pickupAddress": "123 Bay St",
        "destinationAddress": "YYZ Airport",
        "airline": "",
        "message": "Two child seats"
    })
}

/// Intake wired to in-memory capabilities.
#[must_use]
pub fn intake(
    catalog: &InMemoryCatalog,
    store: &InMemoryReservationStore,
    broadcast: BroadcastSink,
    mailer: Arc<dyn Mailer>,
) -> ReservationIntake {
    ReservationIntake::new(
        Arc::new(catalog.clone()),
        Arc::new(store.clone()),
        broadcast,
        mailer,
        ADMIN_EMAIL,
    )
}
