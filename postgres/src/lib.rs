//! `PostgreSQL` storage for the booking service.
//!
//! - [`PgReservationStore`] implements `booking_core::ReservationStore`
//! - [`PgCatalog`] implements `booking_core::Catalog` and `CatalogAdmin`
//!
//! Queries are built at runtime with `sqlx::query_as`; the schema ships as
//! embedded migrations applied by [`migrate`].
//!
//! # Example
//!
//! ```no_run
//! use booking_postgres::{PgCatalog, PgReservationStore, PoolSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = booking_postgres::connect(&PoolSettings::new("postgres://localhost/booking")).await?;
//! booking_postgres::migrate(&pool).await?;
//! let store = PgReservationStore::new(pool.clone());
//! let catalog = PgCatalog::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod reservations;

pub use catalog::PgCatalog;
pub use reservations::PgReservationStore;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// `postgres://` connection string
    pub url: String,
    /// Pool size
    pub max_connections: u32,
    /// How long to wait for a connection
    pub connect_timeout: Duration,
}

impl PoolSettings {
    /// Settings with the default pool size (10) and timeout (30 s).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a connection pool.
///
/// # Errors
///
/// Returns the driver error when the database cannot be reached.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect(&settings.url)
        .await?;
    tracing::info!(max_connections = settings.max_connections, "database pool ready");
    Ok(pool)
}

/// Apply the embedded schema migrations.
///
/// # Errors
///
/// Returns the migration error when a script fails.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Round-trip a trivial query.
///
/// # Errors
///
/// Returns the driver error when the database does not answer.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
