//! Catalog endpoints.
//!
//! Public (used by the booking form, sorted by name):
//! - GET /api/service-types
//! - GET /api/vehicles
//!
//! Back office (admin only, newest first):
//! - GET|POST /api/admin/service-types
//! - PATCH|DELETE /api/admin/service-types/:id
//! - GET|POST /api/admin/vehicles
//! - PATCH|DELETE /api/admin/vehicles/:id

use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use booking_core::catalog::CatalogOrder;
use booking_core::types::{CatalogId, ServiceType, VehicleDraft, VehiclePreference};
use booking_web::{AppError, RequireAdmin};
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// Response Types
// ============================================================================

/// A service type as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceTypeView {
    /// Identifier
    pub id: CatalogId,
    /// Display name
    pub name: String,
}

impl From<ServiceType> for ServiceTypeView {
    fn from(entry: ServiceType) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
        }
    }
}

/// A vehicle preference as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleView {
    /// Identifier
    pub id: CatalogId,
    /// Display name
    pub name: String,
    /// Marketing category
    pub category: String,
    /// Image URL
    pub image: String,
    /// Passenger capacity
    pub passengers: u32,
    /// Luggage capacity
    pub luggage: u32,
    /// Description
    pub description: String,
}

impl From<VehiclePreference> for VehicleView {
    fn from(entry: VehiclePreference) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            category: entry.category,
            image: entry.image,
            passengers: entry.passengers,
            luggage: entry.luggage,
            description: entry.description,
        }
    }
}

/// Public listing wrapper.
#[derive(Debug, Serialize)]
pub struct Items<T> {
    /// Entries sorted by name
    pub items: Vec<T>,
}

/// `{ok: true}`.
#[derive(Debug, Serialize)]
pub struct Ack {
    /// Always `true`
    pub ok: bool,
}

impl Ack {
    pub(crate) const OK: Self = Self { ok: true };
}

// ============================================================================
// Request parsing
// ============================================================================

/// Body as JSON, or `null` when it is not JSON.
fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

fn required_name(body: &Value) -> Result<String, AppError> {
    body.get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::bad_request("Name is required"))
}

fn text_field(body: &Value, field: &str) -> String {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Capacity field. Numbers and numeric strings are accepted; anything else,
/// including negatives, counts as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_field(body: &Value, field: &str) -> u32 {
    let raw = match body.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(value) if value.is_finite() && value >= 1.0 => {
            value.min(f64::from(u32::MAX)).trunc() as u32
        }
        _ => 0,
    }
}

fn vehicle_draft(body: &Value) -> Result<VehicleDraft, AppError> {
    Ok(VehicleDraft {
        name: required_name(body)?,
        category: text_field(body, "category"),
        image: text_field(body, "image"),
        passengers: count_field(body, "passengers"),
        luggage: count_field(body, "luggage"),
        description: text_field(body, "description"),
    })
}

// ============================================================================
// Public handlers
// ============================================================================

/// List service types by name.
///
/// # Errors
///
/// 500 when the catalog is unavailable.
pub async fn public_service_types(
    State(state): State<AppState>,
) -> Result<Json<Items<ServiceTypeView>>, AppError> {
    let items = state.catalog.service_types(CatalogOrder::ByName).await?;
    Ok(Json(Items {
        items: items.into_iter().map(ServiceTypeView::from).collect(),
    }))
}

/// List vehicle preferences by name.
///
/// # Errors
///
/// 500 when the catalog is unavailable.
pub async fn public_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Items<VehicleView>>, AppError> {
    let items = state.catalog.vehicle_preferences(CatalogOrder::ByName).await?;
    Ok(Json(Items {
        items: items.into_iter().map(VehicleView::from).collect(),
    }))
}

// ============================================================================
// Admin handlers: service types
// ============================================================================

/// List service types, newest first.
///
/// # Errors
///
/// 401 without a session, 500 when the catalog is unavailable.
pub async fn list_service_types(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceTypeView>>, AppError> {
    let items = state.catalog.service_types(CatalogOrder::NewestFirst).await?;
    Ok(Json(items.into_iter().map(ServiceTypeView::from).collect()))
}

/// Create a service type.
///
/// # Errors
///
/// 400 without a name, 409 when the name is taken.
pub async fn create_service_type(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ServiceTypeView>), AppError> {
    let name = required_name(&json_body(&body))?;
    let created = state.catalog_admin.create_service_type(name).await?;
    tracing::info!(user = %session.username, id = %created.id, name = %created.name, "service type created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Rename a service type.
///
/// # Errors
///
/// 400 without a name, 404 for an unknown id, 409 when the name is taken.
pub async fn rename_service_type(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let name = required_name(&json_body(&body))?;
    let entry_id = CatalogId::parse(&id).ok_or_else(|| AppError::not_found("Service type", &id))?;
    state
        .catalog_admin
        .rename_service_type(entry_id, name)
        .await?
        .ok_or_else(|| AppError::not_found("Service type", &id))?;
    Ok(Json(Ack::OK))
}

/// Delete a service type. Unknown ids succeed.
///
/// # Errors
///
/// 500 when the catalog is unavailable.
pub async fn delete_service_type(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, AppError> {
    if let Some(entry_id) = CatalogId::parse(&id) {
        let removed = state.catalog_admin.delete_service_type(entry_id).await?;
        tracing::info!(user = %session.username, %id, removed, "service type delete");
    }
    Ok(Json(Ack::OK))
}

// ============================================================================
// Admin handlers: vehicles
// ============================================================================

/// List vehicle preferences, newest first.
///
/// # Errors
///
/// 401 without a session, 500 when the catalog is unavailable.
pub async fn list_vehicles(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleView>>, AppError> {
    let items = state.catalog.vehicle_preferences(CatalogOrder::NewestFirst).await?;
    Ok(Json(items.into_iter().map(VehicleView::from).collect()))
}

/// Create a vehicle preference.
///
/// # Errors
///
/// 400 without a name, 409 when the name is taken.
pub async fn create_vehicle(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<VehicleView>), AppError> {
    let draft = vehicle_draft(&json_body(&body))?;
    let created = state.catalog_admin.create_vehicle_preference(draft).await?;
    tracing::info!(user = %session.username, id = %created.id, name = %created.name, "vehicle preference created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Replace a vehicle preference. Omitted fields are reset to empty or zero.
///
/// # Errors
///
/// 400 without a name, 404 for an unknown id, 409 when the name is taken.
pub async fn update_vehicle(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let draft = vehicle_draft(&json_body(&body))?;
    let entry_id =
        CatalogId::parse(&id).ok_or_else(|| AppError::not_found("Vehicle preference", &id))?;
    state
        .catalog_admin
        .update_vehicle_preference(entry_id, draft)
        .await?
        .ok_or_else(|| AppError::not_found("Vehicle preference", &id))?;
    Ok(Json(Ack::OK))
}

/// Delete a vehicle preference. Unknown ids succeed.
///
/// # Errors
///
/// 500 when the catalog is unavailable.
pub async fn delete_vehicle(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, AppError> {
    if let Some(entry_id) = CatalogId::parse(&id) {
        let removed = state.catalog_admin.delete_vehicle_preference(entry_id).await?;
        tracing::info!(user = %session.username, %id, removed, "vehicle preference delete");
    }
    Ok(Json(Ack::OK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(required_name(&json!({"name": "  Sedan "})).ok().as_deref(), Some("Sedan"));
        for body in [json!({}), json!({"name": 4}), json!({"name": "   "}), Value::Null] {
            let err = required_name(&body).err().map(|e| e.status());
            assert_eq!(err, Some(StatusCode::BAD_REQUEST), "{body}");
        }
    }

    #[test]
    fn counts_accept_numbers_and_numeric_strings() {
        let body = json!({"a": 6, "b": "3", "c": 2.9, "d": -1, "e": "many", "f": null});
        assert_eq!(count_field(&body, "a"), 6);
        assert_eq!(count_field(&body, "b"), 3);
        assert_eq!(count_field(&body, "c"), 2);
        assert_eq!(count_field(&body, "d"), 0);
        assert_eq!(count_field(&body, "e"), 0);
        assert_eq!(count_field(&body, "f"), 0);
        assert_eq!(count_field(&body, "missing"), 0);
    }

    #[test]
    fn vehicle_draft_defaults_missing_fields() {
        let draft = vehicle_draft(&json!({"name": "Van", "category": " Group "})).ok();
        assert_eq!(
            draft,
            Some(VehicleDraft {
                name: "Van".to_string(),
                category: "Group".to_string(),
                ..VehicleDraft::default()
            })
        );
    }

    #[test]
    fn non_json_body_reads_as_null() {
        assert_eq!(json_body(b"name=x"), Value::Null);
    }
}
