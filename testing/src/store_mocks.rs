//! In-memory store and catalog.
//!
//! Both share the same failure switch pattern: call `fail_with(..)` to make
//! every subsequent operation return a storage error, `recover()` to undo it.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use crate::mocks::{FixedClock, test_clock};
use booking_core::catalog::{Catalog, CatalogAdmin, CatalogError, CatalogFuture, CatalogOrder};
use booking_core::environment::Clock;
use booking_core::store::{ReservationStore, StoreError, StoreFuture, clamp_limit};
use booking_core::types::{
    CatalogId, Reservation, ReservationId, ReservationStatus, ResolvedReservation, ServiceType,
    VehicleDraft, VehiclePreference,
};
use std::sync::{Arc, RwLock};

/// In-memory reservation store.
///
/// Reservations are kept in insertion order; listings sort newest first,
/// with later inserts winning ties on `created_at`.
#[derive(Clone)]
pub struct InMemoryReservationStore {
    rows: Arc<RwLock<Vec<Reservation>>>,
    clock: Arc<dyn Clock>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryReservationStore {
    /// Empty store stamped by [`test_clock`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(test_clock()))
    }

    /// Empty store stamped by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            clock,
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Make every operation fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap() = Some(message.into());
    }

    /// Undo [`Self::fail_with`].
    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }

    /// Number of stored reservations
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().unwrap().is_empty()
    }

    /// Snapshot of every stored reservation, in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Reservation> {
        self.rows.read().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.failure.read().unwrap().as_ref() {
            Some(message) => Err(StoreError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStore for InMemoryReservationStore {
    fn create(&self, reservation: ResolvedReservation) -> StoreFuture<'_, Reservation> {
        Box::pin(async move {
            self.check()?;
            let now = self.clock.now();
            let ResolvedReservation {
                request,
                service_type_id,
                vehicle_preference_id,
            } = reservation;
            let stored = Reservation {
                id: ReservationId::new(),
                status: ReservationStatus::New,
                created_at: now,
                updated_at: now,
                name: request.customer.name,
                email: request.customer.email,
                phone: request.customer.phone,
                service_type_id,
                vehicle_preference_id,
                passengers: request.passengers,
                bags: request.bags,
                pickup_at: request.pickup_at,
                pickup_address: request.pickup_address,
                destination_address: request.destination_address,
                airline: request.airline,
                flight_number: request.flight_number,
                message: request.message,
            };
            self.rows.write().unwrap().push(stored.clone());
            Ok(stored)
        })
    }

    fn get(&self, id: ReservationId) -> StoreFuture<'_, Option<Reservation>> {
        Box::pin(async move {
            self.check()?;
            Ok(self.rows.read().unwrap().iter().find(|r| r.id == id).cloned())
        })
    }

    fn list_recent(&self, limit: usize) -> StoreFuture<'_, Vec<Reservation>> {
        Box::pin(async move {
            self.check()?;
            let mut rows: Vec<Reservation> =
                self.rows.read().unwrap().iter().rev().cloned().collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows.truncate(clamp_limit(limit));
            Ok(rows)
        })
    }

    fn update_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.check()?;
            let now = self.clock.now();
            let mut rows = self.rows.write().unwrap();
            Ok(rows.iter_mut().find(|r| r.id == id).is_some_and(|row| {
                row.status = status;
                row.updated_at = now;
                true
            }))
        })
    }
}

#[derive(Default)]
struct CatalogRows {
    service_types: Vec<ServiceType>,
    vehicles: Vec<VehiclePreference>,
}

/// In-memory catalog with unique names per kind.
#[derive(Clone)]
pub struct InMemoryCatalog {
    rows: Arc<RwLock<CatalogRows>>,
    clock: Arc<FixedClock>,
    failure: Arc<RwLock<Option<String>>>,
}

impl InMemoryCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(CatalogRows::default())),
            clock: Arc::new(test_clock()),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Insert a service type directly, bypassing the uniqueness check.
    pub fn add_service_type(&self, name: &str) -> ServiceType {
        let entry = ServiceType {
            id: CatalogId::new(),
            name: name.to_string(),
            created_at: self.tick(),
        };
        self.rows.write().unwrap().service_types.push(entry.clone());
        entry
    }

    /// Insert a vehicle preference directly, bypassing the uniqueness check.
    pub fn add_vehicle(&self, name: &str) -> VehiclePreference {
        let entry = vehicle_from(
            CatalogId::new(),
            VehicleDraft {
                name: name.to_string(),
                passengers: 3,
                luggage: 3,
                ..VehicleDraft::default()
            },
            self.tick(),
        );
        self.rows.write().unwrap().vehicles.push(entry.clone());
        entry
    }

    /// Make every operation fail with `message`.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap() = Some(message.into());
    }

    /// Undo [`Self::fail_with`].
    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }

    // Each insert gets a distinct timestamp so newest-first ordering is stable.
    fn tick(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.advance(chrono::Duration::seconds(1));
        self.clock.now()
    }

    fn check(&self) -> Result<(), CatalogError> {
        match self.failure.read().unwrap().as_ref() {
            Some(message) => Err(CatalogError::Storage(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn vehicle_from(
    id: CatalogId,
    draft: VehicleDraft,
    created_at: chrono::DateTime<chrono::Utc>,
) -> VehiclePreference {
    VehiclePreference {
        id,
        name: draft.name,
        category: draft.category,
        image: draft.image,
        passengers: draft.passengers,
        luggage: draft.luggage,
        description: draft.description,
        created_at,
    }
}

impl Catalog for InMemoryCatalog {
    fn service_type(&self, id: CatalogId) -> CatalogFuture<'_, Option<ServiceType>> {
        Box::pin(async move {
            self.check()?;
            let rows = self.rows.read().unwrap();
            Ok(rows.service_types.iter().find(|s| s.id == id).cloned())
        })
    }

    fn vehicle_preference(&self, id: CatalogId) -> CatalogFuture<'_, Option<VehiclePreference>> {
        Box::pin(async move {
            self.check()?;
            let rows = self.rows.read().unwrap();
            Ok(rows.vehicles.iter().find(|v| v.id == id).cloned())
        })
    }

    fn service_type_named<'a>(&'a self, name: &'a str) -> CatalogFuture<'a, Option<ServiceType>> {
        Box::pin(async move {
            self.check()?;
            let rows = self.rows.read().unwrap();
            Ok(rows.service_types.iter().find(|s| s.name == name).cloned())
        })
    }

    fn vehicle_preference_named<'a>(
        &'a self,
        name: &'a str,
    ) -> CatalogFuture<'a, Option<VehiclePreference>> {
        Box::pin(async move {
            self.check()?;
            let rows = self.rows.read().unwrap();
            Ok(rows.vehicles.iter().find(|v| v.name == name).cloned())
        })
    }

    fn service_types(&self, order: CatalogOrder) -> CatalogFuture<'_, Vec<ServiceType>> {
        Box::pin(async move {
            self.check()?;
            let mut items = self.rows.read().unwrap().service_types.clone();
            match order {
                CatalogOrder::ByName => items.sort_by(|a, b| a.name.cmp(&b.name)),
                CatalogOrder::NewestFirst => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            }
            Ok(items)
        })
    }

    fn vehicle_preferences(&self, order: CatalogOrder) -> CatalogFuture<'_, Vec<VehiclePreference>> {
        Box::pin(async move {
            self.check()?;
            let mut items = self.rows.read().unwrap().vehicles.clone();
            match order {
                CatalogOrder::ByName => items.sort_by(|a, b| a.name.cmp(&b.name)),
                CatalogOrder::NewestFirst => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            }
            Ok(items)
        })
    }
}

impl CatalogAdmin for InMemoryCatalog {
    fn create_service_type(&self, name: String) -> CatalogFuture<'_, ServiceType> {
        Box::pin(async move {
            self.check()?;
            let created_at = self.tick();
            let mut rows = self.rows.write().unwrap();
            if rows.service_types.iter().any(|s| s.name == name) {
                return Err(CatalogError::DuplicateName(name));
            }
            let entry = ServiceType {
                id: CatalogId::new(),
                name,
                created_at,
            };
            rows.service_types.push(entry.clone());
            Ok(entry)
        })
    }

    fn rename_service_type(
        &self,
        id: CatalogId,
        name: String,
    ) -> CatalogFuture<'_, Option<ServiceType>> {
        Box::pin(async move {
            self.check()?;
            let mut rows = self.rows.write().unwrap();
            if rows.service_types.iter().any(|s| s.name == name && s.id != id) {
                return Err(CatalogError::DuplicateName(name));
            }
            Ok(rows.service_types.iter_mut().find(|s| s.id == id).map(|s| {
                s.name = name;
                s.clone()
            }))
        })
    }

    fn delete_service_type(&self, id: CatalogId) -> CatalogFuture<'_, bool> {
        Box::pin(async move {
            self.check()?;
            let mut rows = self.rows.write().unwrap();
            let before = rows.service_types.len();
            rows.service_types.retain(|s| s.id != id);
            Ok(rows.service_types.len() != before)
        })
    }

    fn create_vehicle_preference(
        &self,
        draft: VehicleDraft,
    ) -> CatalogFuture<'_, VehiclePreference> {
        Box::pin(async move {
            self.check()?;
            let created_at = self.tick();
            let mut rows = self.rows.write().unwrap();
            if rows.vehicles.iter().any(|v| v.name == draft.name) {
                return Err(CatalogError::DuplicateName(draft.name));
            }
            let entry = vehicle_from(CatalogId::new(), draft, created_at);
            rows.vehicles.push(entry.clone());
            Ok(entry)
        })
    }

    fn update_vehicle_preference(
        &self,
        id: CatalogId,
        draft: VehicleDraft,
    ) -> CatalogFuture<'_, Option<VehiclePreference>> {
        Box::pin(async move {
            self.check()?;
            let mut rows = self.rows.write().unwrap();
            if rows.vehicles.iter().any(|v| v.name == draft.name && v.id != id) {
                return Err(CatalogError::DuplicateName(draft.name));
            }
            Ok(rows.vehicles.iter_mut().find(|v| v.id == id).map(|v| {
                *v = vehicle_from(id, draft, v.created_at);
                v.clone()
            }))
        })
    }

    fn delete_vehicle_preference(&self, id: CatalogId) -> CatalogFuture<'_, bool> {
        Box::pin(async move {
            self.check()?;
            let mut rows = self.rows.write().unwrap();
            let before = rows.vehicles.len();
            rows.vehicles.retain(|v| v.id != id);
            Ok(rows.vehicles.len() != before)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let catalog = InMemoryCatalog::new();
        catalog.create_service_type("Airport Transfer".into()).await.unwrap();
        let err = catalog
            .create_service_type("Airport Transfer".into())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateName(name) if name == "Airport Transfer"));
    }

    #[tokio::test]
    async fn newest_first_follows_creation_order() {
        let catalog = InMemoryCatalog::new();
        catalog.add_service_type("B");
        catalog.add_service_type("A");
        let newest: Vec<String> = catalog
            .service_types(CatalogOrder::NewestFirst)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(newest, vec!["A", "B"]);
        let by_name: Vec<String> = catalog
            .service_types(CatalogOrder::ByName)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(by_name, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn failure_switch_affects_every_operation() {
        let store = InMemoryReservationStore::new();
        store.fail_with("connection reset");
        assert!(store.list_recent(10).await.is_err());
        store.recover();
        assert!(store.list_recent(10).await.unwrap().is_empty());
    }
}
