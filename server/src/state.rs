//! Application state shared by every handler.
//!
//! Capabilities are held as trait objects so the same router runs against
//! `PostgreSQL` in production and in-memory doubles in tests.

use crate::uploads::UploadDir;
use axum::extract::FromRef;
use booking_auth::{AdminCredentials, TokenRegistry};
use booking_core::broadcast::BroadcastSink;
use booking_core::catalog::{Catalog, CatalogAdmin};
use booking_core::email::Mailer;
use booking_core::intake::ReservationIntake;
use booking_core::store::ReservationStore;
use booking_notify::BroadcastHub;
use booking_web::handlers::health::ProbeFuture;
use booking_web::handlers::ReadinessProbe;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Admin login configuration plus the session registry.
#[derive(Clone)]
pub struct AdminGate {
    /// Configured account. `None` disables login.
    pub credentials: Option<AdminCredentials>,
    /// Issued sessions
    pub tokens: Arc<dyn TokenRegistry>,
    /// Session lifetime, used for the cookie `Max-Age`
    pub ttl: chrono::Duration,
    /// Add `Secure` to the session cookie
    pub secure_cookie: bool,
}

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is an `Arc` or a handle.
#[derive(Clone)]
pub struct AppState {
    /// Submission pipeline
    pub intake: ReservationIntake,
    /// Reservation persistence
    pub store: Arc<dyn ReservationStore>,
    /// Catalog reads
    pub catalog: Arc<dyn Catalog>,
    /// Catalog writes
    pub catalog_admin: Arc<dyn CatalogAdmin>,
    /// Live viewer hub
    pub hub: Arc<BroadcastHub>,
    /// Admin gate
    pub gate: AdminGate,
    /// Dependency checked by `GET /ready`
    pub readiness: Arc<dyn ReadinessProbe>,
    /// Prometheus renderer for `GET /metrics`
    pub metrics: Option<PrometheusHandle>,
    /// Vehicle image storage
    pub uploads: UploadDir,
}

impl AppState {
    /// Wire the state from concrete capabilities.
    ///
    /// The intake pipeline publishes through `hub` and mails `admin_email`.
    #[must_use]
    pub fn new<C, S>(
        catalog: Arc<C>,
        store: Arc<S>,
        hub: Arc<BroadcastHub>,
        mailer: Arc<dyn Mailer>,
        admin_email: &str,
        gate: AdminGate,
    ) -> Self
    where
        C: CatalogAdmin + 'static,
        S: ReservationStore + 'static,
    {
        let catalog_read: Arc<dyn Catalog> = catalog.clone();
        let store: Arc<dyn ReservationStore> = store;
        let intake = ReservationIntake::new(
            catalog_read.clone(),
            store.clone(),
            BroadcastSink::active(hub.clone()),
            mailer,
            admin_email,
        );

        Self {
            intake,
            store,
            catalog: catalog_read,
            catalog_admin: catalog,
            hub,
            gate,
            readiness: Arc::new(AlwaysReady),
            metrics: None,
            uploads: UploadDir::default(),
        }
    }

    /// Replace the readiness probe.
    #[must_use]
    pub fn with_readiness(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.readiness = probe;
        self
    }

    /// Serve `GET /metrics` from this recorder.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Store uploaded images in `uploads`.
    #[must_use]
    pub fn with_uploads(mut self, uploads: UploadDir) -> Self {
        self.uploads = uploads;
        self
    }
}

impl FromRef<AppState> for Arc<dyn TokenRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.gate.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<BroadcastHub> {
    fn from_ref(state: &AppState) -> Self {
        state.hub.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ReadinessProbe> {
    fn from_ref(state: &AppState) -> Self {
        state.readiness.clone()
    }
}

/// Probe for setups without external dependencies.
struct AlwaysReady;

impl ReadinessProbe for AlwaysReady {
    fn component(&self) -> &'static str {
        "process"
    }

    fn check(&self) -> ProbeFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}
