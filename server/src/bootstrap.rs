//! Start-up wiring: database, mailer, hub and admin gate from [`Config`].

use crate::config::Config;
use crate::state::{AdminGate, AppState};
use crate::uploads::UploadDir;
use anyhow::Context;
use booking_auth::{AdminCredentials, DEFAULT_TTL, InMemoryTokenRegistry};
use booking_notify::BroadcastHub;
use booking_postgres::{PgCatalog, PgReservationStore, PoolSettings};
use booking_web::handlers::ReadinessProbe;
use booking_web::handlers::health::ProbeFuture;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// `GET /ready` probe that pings the database.
pub struct DatabaseProbe {
    pool: PgPool,
}

impl DatabaseProbe {
    /// Probe over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReadinessProbe for DatabaseProbe {
    fn component(&self) -> &'static str {
        "database"
    }

    fn check(&self) -> ProbeFuture<'_> {
        Box::pin(async move {
            booking_postgres::ping(&self.pool)
                .await
                .map_err(|e| e.to_string())
        })
    }
}

/// Install the global Prometheus recorder and describe the service metrics.
///
/// # Errors
///
/// Fails when a recorder is already installed.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_counter!(
        "booking.reservations.submitted",
        "Reservation submissions by outcome (accepted, invalid, unresolved, error)"
    );
    describe_counter!(
        "booking.notifications.broadcast",
        "Live fan-out attempts by outcome"
    );
    describe_counter!("booking.notifications.email", "Notification emails by outcome");
    describe_counter!("booking.store.errors", "Failed reservation queries by operation");
    describe_counter!("booking.catalog.errors", "Failed catalog queries by operation");
    describe_gauge!("booking.viewers.connected", "Admin viewers currently connected");
}

/// Open and migrate the database described by `config`.
///
/// # Errors
///
/// Connection or migration failure.
pub async fn database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = PoolSettings {
        url: config.database.url.expose().to_string(),
        max_connections: config.database.max_connections,
        connect_timeout: Duration::from_secs(config.database.connect_timeout),
    };
    let pool = booking_postgres::connect(&settings)
        .await
        .context("Failed to connect to PostgreSQL")?;
    booking_postgres::migrate(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(pool)
}

/// Admin gate from configuration. Login stays disabled unless both the
/// username and the password are set.
#[must_use]
pub fn admin_gate(config: &Config) -> AdminGate {
    let admin = &config.admin;
    let credentials = match (&admin.username, &admin.password) {
        (Some(username), Some(password)) => {
            Some(AdminCredentials::new(username.clone(), password.expose()))
        }
        _ => {
            tracing::warn!("ADMIN_USERNAME or ADMIN_PASSWORD not set; admin login disabled");
            None
        }
    };
    let ttl = i64::try_from(admin.token_ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(DEFAULT_TTL);

    AdminGate {
        credentials,
        tokens: Arc::new(InMemoryTokenRegistry::new(ttl)),
        ttl,
        secure_cookie: admin.cookie_secure,
    }
}

/// Build the full application state against `PostgreSQL`.
///
/// # Errors
///
/// Database or mailer set-up failure.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let pool = database(config).await?;
    let mailer = booking_notify::build_mailer(config.mail.settings())
        .context("Failed to configure the mailer")?;
    let hub = BroadcastHub::new(config.viewers.capacity, config.viewers.max_viewers);

    let state = AppState::new(
        Arc::new(PgCatalog::new(pool.clone())),
        Arc::new(PgReservationStore::new(pool.clone())),
        hub,
        mailer,
        &config.mail.admin_email_to,
        admin_gate(config),
    )
    .with_readiness(Arc::new(DatabaseProbe::new(pool)))
    .with_uploads(UploadDir::new(
        config.uploads.dir.clone(),
        config.uploads.public_base_url.clone(),
    ));

    Ok(state)
}
