//! Apply migrations and insert the default catalog.
//!
//! Safe to run repeatedly: entries are keyed by name and existing ones are
//! left alone.

use booking_core::seed::seed_catalog;
use booking_postgres::PgCatalog;
use booking_server::{Config, bootstrap};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let pool = bootstrap::database(&config).await?;
    let catalog = PgCatalog::new(pool.clone());

    let report = seed_catalog(&catalog).await?;
    info!(
        created = report.created,
        refreshed = report.refreshed,
        unchanged = report.unchanged,
        "catalog seeded"
    );

    pool.close().await;
    Ok(())
}
