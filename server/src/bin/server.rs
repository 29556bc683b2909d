//! Transport booking HTTP server.

use booking_server::{Config, bootstrap, build_router};
use std::future::IntoFuture;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booking_server=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting transport booking server");

    let config = Config::from_env();
    info!(
        host = %config.server.host,
        port = config.server.port,
        mail_mode = ?config.mail.mode,
        admin_login = config.admin.username.is_some(),
        "Configuration loaded"
    );

    let metrics = bootstrap::install_metrics()?;
    let state = bootstrap::build_state(&config).await?.with_metrics(metrics);
    let app = build_router(state, &config.server.cors_allowed_origins);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&address).await?;
    info!(%address, "HTTP server listening");

    let grace = Duration::from_secs(config.server.shutdown_timeout);
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = signalled_tx.send(());
            })
            .into_future(),
    );

    tokio::select! {
        joined = &mut server => joined??,
        _ = signalled_rx => match tokio::time::timeout(grace, &mut server).await {
            Ok(joined) => joined??,
            Err(_) => warn!(timeout_secs = grace.as_secs(), "graceful shutdown timed out"),
        },
    }

    info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal, shutting down gracefully..."),
        () = terminate => info!("Received SIGTERM signal, shutting down gracefully..."),
    }
}
