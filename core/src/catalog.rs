//! Catalog capabilities: service types and vehicle preferences.
//!
//! The intake pipeline only needs read access ([`Catalog`]). The back office
//! also edits the catalog through [`CatalogAdmin`]. Both traits return boxed
//! futures so they can be held as `Arc<dyn Catalog>`.

use crate::types::{CatalogId, ServiceType, VehicleDraft, VehiclePreference};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by catalog operations.
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Errors raised by catalog backends.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Another entry of the same kind already uses this name.
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// Backend failure (connection lost, query failed, ...).
    #[error("Catalog storage error: {0}")]
    Storage(String),
}

/// Listing order for catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogOrder {
    /// Alphabetical, for the public booking form
    #[default]
    ByName,
    /// Most recently created first, for the back office
    NewestFirst,
}

/// Read access to the catalog.
pub trait Catalog: Send + Sync {
    /// Look up a service type. `Ok(None)` means it does not exist.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn service_type(&self, id: CatalogId) -> CatalogFuture<'_, Option<ServiceType>>;

    /// Look up a vehicle preference. `Ok(None)` means it does not exist.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn vehicle_preference(&self, id: CatalogId) -> CatalogFuture<'_, Option<VehiclePreference>>;

    /// Look up a service type by its unique name.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn service_type_named<'a>(&'a self, name: &'a str) -> CatalogFuture<'a, Option<ServiceType>>;

    /// Look up a vehicle preference by its unique name.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn vehicle_preference_named<'a>(
        &'a self,
        name: &'a str,
    ) -> CatalogFuture<'a, Option<VehiclePreference>>;

    /// List every service type.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn service_types(&self, order: CatalogOrder) -> CatalogFuture<'_, Vec<ServiceType>>;

    /// List every vehicle preference.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn vehicle_preferences(&self, order: CatalogOrder) -> CatalogFuture<'_, Vec<VehiclePreference>>;
}

/// Write access to the catalog, used by the back office and the seeder.
///
/// Names are unique per kind; creating or renaming onto a taken name fails
/// with [`CatalogError::DuplicateName`]. Deleting an entry does not touch
/// reservations that reference it.
pub trait CatalogAdmin: Catalog {
    /// Create a service type.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateName`] or [`CatalogError::Storage`].
    fn create_service_type(&self, name: String) -> CatalogFuture<'_, ServiceType>;

    /// Rename a service type. `Ok(None)` when the id is unknown.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateName`] or [`CatalogError::Storage`].
    fn rename_service_type(
        &self,
        id: CatalogId,
        name: String,
    ) -> CatalogFuture<'_, Option<ServiceType>>;

    /// Delete a service type. Returns whether something was removed.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn delete_service_type(&self, id: CatalogId) -> CatalogFuture<'_, bool>;

    /// Create a vehicle preference.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateName`] or [`CatalogError::Storage`].
    fn create_vehicle_preference(&self, draft: VehicleDraft)
    -> CatalogFuture<'_, VehiclePreference>;

    /// Replace a vehicle preference's attributes. `Ok(None)` when the id is unknown.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateName`] or [`CatalogError::Storage`].
    fn update_vehicle_preference(
        &self,
        id: CatalogId,
        draft: VehicleDraft,
    ) -> CatalogFuture<'_, Option<VehiclePreference>>;

    /// Delete a vehicle preference. Returns whether something was removed.
    ///
    /// # Errors
    ///
    /// [`CatalogError::Storage`] when the backend cannot be reached.
    fn delete_vehicle_preference(&self, id: CatalogId) -> CatalogFuture<'_, bool>;
}
