//! Back-office reservation endpoints.
//!
//! - GET /api/admin/reservations - Newest reservations with catalog names
//! - PATCH /api/admin/reservations/:id - Change a reservation's status

use crate::api::catalog::Ack;
use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use booking_core::admin::{self, ReservationSummary};
use booking_web::{AppError, RequireAdmin};
use serde_json::Value;

/// List the newest reservations.
///
/// # Errors
///
/// 401 without a session, 500 on backend failure.
pub async fn list_reservations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationSummary>>, AppError> {
    let rows = admin::recent_reservations(state.store.as_ref(), state.catalog.as_ref()).await?;
    Ok(Json(rows))
}

/// Set a reservation's status from a `{status}` body.
///
/// # Errors
///
/// 400 "Invalid status", 404 for an unknown reservation, 500 on store failure.
pub async fn update_status(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Ack>, AppError> {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let status = body.get("status").and_then(Value::as_str);

    let applied = admin::change_status(state.store.as_ref(), &id, status).await?;
    tracing::info!(user = %session.username, reservation_id = %id, status = %applied, "status updated from back office");
    Ok(Json(Ack::OK))
}
