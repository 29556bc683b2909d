//! Back-office reservation operations: the recent listing and status changes.

use crate::catalog::{Catalog, CatalogError};
use crate::store::{MAX_PAGE_SIZE, ReservationStore, StoreError};
use crate::types::{CatalogId, ReservationId, ReservationStatus};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// One row of the back-office reservation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    /// Reservation id
    pub id: ReservationId,
    /// Current status
    pub status: ReservationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Customer name
    pub name: String,
    /// Customer email
    pub email: String,
    /// Customer phone
    pub phone: String,
    /// Service type name, empty when the entry was deleted
    pub service_type: String,
    /// Vehicle preference name, empty when the entry was deleted
    pub vehicle_preference: String,
    /// Pickup instant
    pub pickup_at: DateTime<Utc>,
    /// Pickup address
    pub pickup_address: String,
}

/// Errors from back-office operations.
#[derive(Error, Debug)]
pub enum AdminError {
    /// The requested status is not one of the accepted values.
    #[error("Invalid status")]
    InvalidStatus,

    /// No reservation has this id.
    #[error("Reservation not found")]
    NotFound,

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Catalog failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The newest reservations with their catalog names filled in.
///
/// # Errors
///
/// [`AdminError::Store`] or [`AdminError::Catalog`] on backend failure.
pub async fn recent_reservations(
    store: &dyn ReservationStore,
    catalog: &dyn Catalog,
) -> Result<Vec<ReservationSummary>, AdminError> {
    let reservations = store.list_recent(MAX_PAGE_SIZE).await?;

    let service_ids: BTreeSet<CatalogId> =
        reservations.iter().map(|r| r.service_type_id).collect();
    let vehicle_ids: BTreeSet<CatalogId> =
        reservations.iter().map(|r| r.vehicle_preference_id).collect();

    let (services, vehicles) = futures::try_join!(
        try_join_all(service_ids.into_iter().map(|id| catalog.service_type(id))),
        try_join_all(vehicle_ids.into_iter().map(|id| catalog.vehicle_preference(id))),
    )?;

    let service_names: HashMap<CatalogId, String> =
        services.into_iter().flatten().map(|s| (s.id, s.name)).collect();
    let vehicle_names: HashMap<CatalogId, String> =
        vehicles.into_iter().flatten().map(|v| (v.id, v.name)).collect();

    Ok(reservations
        .into_iter()
        .map(|r| ReservationSummary {
            service_type: service_names
                .get(&r.service_type_id)
                .cloned()
                .unwrap_or_default(),
            vehicle_preference: vehicle_names
                .get(&r.vehicle_preference_id)
                .cloned()
                .unwrap_or_default(),
            id: r.id,
            status: r.status,
            created_at: r.created_at,
            name: r.name,
            email: r.email,
            phone: r.phone,
            pickup_at: r.pickup_at,
            pickup_address: r.pickup_address,
        })
        .collect())
}

/// Set a reservation's status.
///
/// `status` is checked before the id, so a bad status never touches the store.
/// Setting the status a reservation already has succeeds.
///
/// # Errors
///
/// [`AdminError::InvalidStatus`], [`AdminError::NotFound`] (also for ids that
/// are not UUIDs) or [`AdminError::Store`].
pub async fn change_status(
    store: &dyn ReservationStore,
    id: &str,
    status: Option<&str>,
) -> Result<ReservationStatus, AdminError> {
    let status: ReservationStatus = status
        .ok_or(AdminError::InvalidStatus)?
        .parse()
        .map_err(|_| AdminError::InvalidStatus)?;
    let id = ReservationId::parse(id).ok_or(AdminError::NotFound)?;

    if store.update_status(id, status).await? {
        tracing::info!(reservation_id = %id, %status, "reservation status changed");
        Ok(status)
    } else {
        Err(AdminError::NotFound)
    }
}
