//! Only4kiddos booking backend HTTP server.

use only4kiddos_server::{app, config::Config, metrics};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::Notify};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "only4kiddos=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Only4kiddos booking backend");

    let config = Config::from_env()?;
    info!(
        addr = %config.server.addr(),
        metrics_addr = %config.metrics.addr(),
        store = ?config.ledger.store,
        over_release = ?config.ledger.over_release,
        seed_sample_data = config.seed_sample_data,
        "Configuration loaded"
    );

    let handle = metrics::install()?;
    metrics::serve(config.metrics.addr(), handle).await?;

    let router = app::build(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.server.addr()).await?;
    info!(addr = %config.server.addr(), "Server listening");

    let stop = Arc::new(Notify::new());
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown({
        let stop = Arc::clone(&stop);
        async move { stop.notified().await }
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    stop.notify_one();
    match tokio::time::timeout(config.server.shutdown_timeout, server).await {
        Ok(result) => result??,
        Err(_) => warn!(
            timeout = ?config.server.shutdown_timeout,
            "In-flight requests did not finish before the shutdown timeout"
        ),
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
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
