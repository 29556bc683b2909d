//! Reservation intake orchestrator.
//!
//! One submission moves through these stages, strictly in order:
//!
//! ```text
//! Received ─> Validated ─> ReferencesResolved ─> Persisted ─> Notified ─> Responded
//!    │            │
//!    ▼            ▼
//! RejectedInvalid  RejectedUnresolved
//! ```
//!
//! Once a reservation is persisted the outcome is fixed: notification
//! problems are logged and counted but never change what the submitter is
//! told. Notifications run on a spawned task so the response does not wait
//! on the mail relay.

use crate::broadcast::{BroadcastSink, FanOut};
use crate::catalog::{Catalog, CatalogError};
use crate::email::{Delivery, EmailMessage, Mailer};
use crate::resolver::{self, ResolveError, ResolvedReferences};
use crate::store::{ReservationStore, StoreError};
use crate::types::{NewReservation, NotificationEvent, Reservation, ReservationId};
use crate::validation::{self, ValidationErrors};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Stage a submission has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStage {
    /// Body received
    Received,
    /// Fields passed validation
    Validated,
    /// Both catalog references exist
    ReferencesResolved,
    /// Reservation written to the store
    Persisted,
    /// Fan-out and email attempted
    Notified,
    /// Outcome returned to the submitter
    Responded,
    /// Validation failed
    RejectedInvalid,
    /// A catalog reference does not exist
    RejectedUnresolved,
}

impl IntakeStage {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::ReferencesResolved => "references_resolved",
            Self::Persisted => "persisted",
            Self::Notified => "notified",
            Self::Responded => "responded",
            Self::RejectedInvalid => "rejected_invalid",
            Self::RejectedUnresolved => "rejected_unresolved",
        }
    }
}

/// Why a submission was not accepted.
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Field validation failed; nothing was looked up or written.
    #[error(transparent)]
    Invalid(ValidationErrors),

    /// A catalog reference does not exist; nothing was written.
    #[error("Invalid serviceTypeId or vehiclePreferenceId")]
    Unresolved,

    /// The catalog could not be queried.
    #[error("Catalog unavailable: {0}")]
    Catalog(#[source] CatalogError),

    /// The reservation could not be written.
    #[error("Failed to persist reservation: {0}")]
    Persistence(#[source] StoreError),
}

impl IntakeError {
    /// Terminal stage for this failure.
    #[must_use]
    pub const fn stage(&self) -> IntakeStage {
        match self {
            Self::Invalid(_) => IntakeStage::RejectedInvalid,
            Self::Unresolved => IntakeStage::RejectedUnresolved,
            Self::Catalog(_) => IntakeStage::Validated,
            Self::Persistence(_) => IntakeStage::ReferencesResolved,
        }
    }

    /// True for failures caused by the submitter rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Invalid(_) | Self::Unresolved)
    }
}

impl From<ResolveError> for IntakeError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Unresolved => Self::Unresolved,
            ResolveError::Catalog(e) => Self::Catalog(e),
        }
    }
}

/// What happened to the notification email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    /// Relay accepted the message
    Sent,
    /// No relay configured
    Skipped,
    /// Relay failed (logged)
    Failed,
}

/// Result of the best-effort notification task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationReport {
    /// Fan-out result
    pub fan_out: FanOut,
    /// Email result
    pub email: EmailOutcome,
}

/// A persisted submission.
#[derive(Debug)]
pub struct Accepted {
    /// Identifier of the new reservation
    pub reservation_id: ReservationId,
    /// Notification task. Dropping it detaches the task.
    pub notifications: JoinHandle<NotificationReport>,
}

/// Drives a submission through validation, resolution, persistence and
/// notification.
#[derive(Clone)]
pub struct ReservationIntake {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn ReservationStore>,
    broadcast: BroadcastSink,
    mailer: Arc<dyn Mailer>,
    admin_email: Arc<str>,
}

impl ReservationIntake {
    /// Wire the pipeline to its capabilities.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn ReservationStore>,
        broadcast: BroadcastSink,
        mailer: Arc<dyn Mailer>,
        admin_email: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            catalog,
            store,
            broadcast,
            mailer,
            admin_email: admin_email.into(),
        }
    }

    /// Submit a raw request body.
    ///
    /// # Errors
    ///
    /// See [`IntakeError`]. Notification failures are never returned.
    pub async fn submit_bytes(&self, body: &[u8]) -> Result<Accepted, IntakeError> {
        self.run(validation::parse_submission(body)).await
    }

    /// Submit an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// See [`IntakeError`]. Notification failures are never returned.
    pub async fn submit(&self, raw: &Value) -> Result<Accepted, IntakeError> {
        self.run(validation::validate_submission(raw)).await
    }

    async fn run(
        &self,
        validated: Result<NewReservation, ValidationErrors>,
    ) -> Result<Accepted, IntakeError> {
        let result = self.persist(validated).await;
        let outcome = match &result {
            Ok(_) => "accepted",
            Err(IntakeError::Invalid(_)) => "invalid",
            Err(IntakeError::Unresolved) => "unresolved",
            Err(IntakeError::Catalog(_) | IntakeError::Persistence(_)) => "error",
        };
        metrics::counter!("booking.reservations.submitted", "outcome" => outcome).increment(1);
        result
    }

    async fn persist(
        &self,
        validated: Result<NewReservation, ValidationErrors>,
    ) -> Result<Accepted, IntakeError> {
        tracing::debug!(stage = IntakeStage::Received.as_str(), "reservation submitted");

        let request = validated.map_err(|errors| {
            tracing::info!(
                stage = IntakeStage::RejectedInvalid.as_str(),
                details = ?errors.details(),
                "reservation rejected: invalid payload"
            );
            IntakeError::Invalid(errors)
        })?;
        tracing::debug!(stage = IntakeStage::Validated.as_str(), "reservation validated");

        let (resolved, names) = resolver::resolve(self.catalog.as_ref(), request)
            .await
            .map_err(|e| {
                let err = IntakeError::from(e);
                match &err {
                    IntakeError::Unresolved => tracing::info!(
                        stage = IntakeStage::RejectedUnresolved.as_str(),
                        "reservation rejected: unknown catalog reference"
                    ),
                    other => tracing::error!(error = %other, "catalog lookup failed"),
                }
                err
            })?;
        tracing::debug!(
            stage = IntakeStage::ReferencesResolved.as_str(),
            service_type = %names.service_type,
            vehicle_preference = %names.vehicle_preference,
            "references resolved"
        );

        let reservation = self.store.create(resolved).await.map_err(|e| {
            tracing::error!(error = %e, "failed to persist reservation");
            IntakeError::Persistence(e)
        })?;
        tracing::info!(
            stage = IntakeStage::Persisted.as_str(),
            reservation_id = %reservation.id,
            "reservation created"
        );

        let reservation_id = reservation.id;
        let notifications = self.spawn_notifications(&reservation, names);
        tracing::debug!(
            stage = IntakeStage::Responded.as_str(),
            %reservation_id,
            "reservation accepted"
        );

        Ok(Accepted {
            reservation_id,
            notifications,
        })
    }

    fn spawn_notifications(
        &self,
        reservation: &Reservation,
        names: ResolvedReferences,
    ) -> JoinHandle<NotificationReport> {
        let event = NotificationEvent::from_reservation(
            reservation,
            names.service_type,
            names.vehicle_preference,
        );
        let broadcast = self.broadcast.clone();
        let mailer = Arc::clone(&self.mailer);
        let admin_email = Arc::clone(&self.admin_email);

        tokio::spawn(async move { notify(&broadcast, mailer.as_ref(), &admin_email, event).await })
    }
}

/// Fan-out first, then email. Both are always attempted.
async fn notify(
    broadcast: &BroadcastSink,
    mailer: &dyn Mailer,
    admin_email: &str,
    event: NotificationEvent,
) -> NotificationReport {
    let fan_out = broadcast.publish(&event);
    let fan_out_label = match fan_out {
        FanOut::NoSink => "skipped",
        FanOut::Delivered(_) => "delivered",
        FanOut::Failed => "failed",
    };
    metrics::counter!("booking.notifications.broadcast", "outcome" => fan_out_label).increment(1);

    let reservation_id = event.id;
    let message = EmailMessage::new_reservation(admin_email, &event);
    let email = match mailer.send(message).await {
        Ok(Delivery::Sent) => {
            tracing::info!(%reservation_id, to = %admin_email, "reservation email sent");
            EmailOutcome::Sent
        }
        Ok(Delivery::Skipped) => EmailOutcome::Skipped,
        Err(e) => {
            tracing::error!(%reservation_id, error = %e, "reservation email failed");
            EmailOutcome::Failed
        }
    };
    let email_label = match email {
        EmailOutcome::Sent => "sent",
        EmailOutcome::Skipped => "skipped",
        EmailOutcome::Failed => "failed",
    };
    metrics::counter!("booking.notifications.email", "outcome" => email_label).increment(1);

    tracing::debug!(
        stage = IntakeStage::Notified.as_str(),
        %reservation_id,
        ?fan_out,
        ?email,
        "notifications finished"
    );
    NotificationReport { fan_out, email }
}
