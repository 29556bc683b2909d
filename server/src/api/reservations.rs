//! Public reservation intake.
//!
//! - POST /api/reservations - Submit the booking form

use crate::state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use booking_core::intake::IntakeError;
use booking_core::resolver::UNRESOLVED_MESSAGE;
use booking_core::types::ReservationId;
use booking_core::validation::ValidationErrors;
use booking_web::{AppError, CorrelationId};
use serde::Serialize;

/// Body of an accepted submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Always `true`
    pub ok: bool,
    /// Id of the stored reservation
    pub reservation_id: ReservationId,
}

/// Body of a rejected submission.
#[derive(Debug, Serialize)]
pub struct RejectedResponse<'a> {
    /// Summary message
    pub error: &'static str,
    /// Form and field errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<&'a ValidationErrors>,
    /// Flattened `field: message` lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Submit a reservation.
///
/// The body is read raw so that malformed JSON gets the same 400 shape as
/// failed field validation. The notification task is detached; the response
/// never waits for email or fan-out.
///
/// # Errors
///
/// 500 with a generic message when the catalog or the store fails.
pub async fn submit(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    body: Bytes,
) -> Result<Response, AppError> {
    match state.intake.submit_bytes(&body).await {
        Ok(accepted) => {
            tracing::info!(
                correlation_id = %correlation_id.0,
                reservation_id = %accepted.reservation_id,
                "reservation accepted"
            );
            drop(accepted.notifications);
            Ok(Json(SubmitResponse {
                ok: true,
                reservation_id: accepted.reservation_id,
            })
            .into_response())
        }
        Err(IntakeError::Invalid(errors)) => {
            tracing::debug!(correlation_id = %correlation_id.0, fields = ?errors.fields().collect::<Vec<_>>(), "invalid submission");
            let body = RejectedResponse {
                error: "Invalid payload",
                issues: Some(&errors),
                details: Some(errors.details()),
            };
            Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
        }
        Err(IntakeError::Unresolved) => {
            tracing::debug!(correlation_id = %correlation_id.0, "submission references unknown catalog entries");
            let body = RejectedResponse {
                error: UNRESOLVED_MESSAGE,
                issues: None,
                details: None,
            };
            Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
        }
        Err(e) => Err(AppError::internal("Failed to create reservation").with_source(e)),
    }
}
