//! Reference resolution: proves that a submission's catalog ids exist.

use crate::catalog::{Catalog, CatalogError};
use crate::types::{CatalogId, NewReservation, ResolvedReservation};
use thiserror::Error;

/// Generic message returned to the submitter for any dangling reference.
pub const UNRESOLVED_MESSAGE: &str = "Invalid serviceTypeId or vehiclePreferenceId";

/// Display names of the entries a submission points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReferences {
    /// Service type name
    pub service_type: String,
    /// Vehicle preference name
    pub vehicle_preference: String,
}

/// Why resolution failed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// At least one reference does not exist (or is not an identifier at all).
    ///
    /// The message is deliberately the same whichever side failed.
    #[error("Invalid serviceTypeId or vehiclePreferenceId")]
    Unresolved,

    /// The catalog could not be queried.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Resolve both references of a validated request.
///
/// The two lookups run concurrently. Nothing is written.
///
/// # Errors
///
/// [`ResolveError::Unresolved`] when either reference is missing or malformed,
/// [`ResolveError::Catalog`] when the catalog fails.
pub async fn resolve(
    catalog: &dyn Catalog,
    request: NewReservation,
) -> Result<(ResolvedReservation, ResolvedReferences), ResolveError> {
    let (Some(service_type_id), Some(vehicle_preference_id)) = (
        CatalogId::parse(&request.service_type_id),
        CatalogId::parse(&request.vehicle_preference_id),
    ) else {
        tracing::debug!(
            service_type_id = %request.service_type_id,
            vehicle_preference_id = %request.vehicle_preference_id,
            "reference is not a catalog id"
        );
        return Err(ResolveError::Unresolved);
    };

    let (service_type, vehicle_preference) = futures::try_join!(
        catalog.service_type(service_type_id),
        catalog.vehicle_preference(vehicle_preference_id),
    )?;

    match (service_type, vehicle_preference) {
        (Some(service_type), Some(vehicle_preference)) => Ok((
            ResolvedReservation {
                request,
                service_type_id,
                vehicle_preference_id,
            },
            ResolvedReferences {
                service_type: service_type.name,
                vehicle_preference: vehicle_preference.name,
            },
        )),
        (service_type, vehicle_preference) => {
            tracing::debug!(
                %service_type_id,
                %vehicle_preference_id,
                service_type_found = service_type.is_some(),
                vehicle_preference_found = vehicle_preference.is_some(),
                "reference not found"
            );
            Err(ResolveError::Unresolved)
        }
    }
}
