mod api;
mod config;
mod dto;
mod error;
mod state;

use std::sync::Arc;

use bruteguard_core::{connect_store, seed_store, AttemptLimiter, Authorizer};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bruteguard_web=debug,bruteguard_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load()?;
    let bind_addr = config.bind_addr;
    let shutdown_timeout = config.shutdown_timeout();

    // Fatal on failure, no retry.
    let store = connect_store(&config.service.storage).await?;
    let seeded = seed_store(store.as_ref(), &config.service.lists).await?;
    if seeded > 0 {
        tracing::info!("seeded {seeded} subnet(s) from config");
    }

    let limiter = Arc::new(AttemptLimiter::new(config.service.limits.clone())?);
    let shutdown = CancellationToken::new();
    let flusher = limiter.spawn_flusher(shutdown.clone());

    let state = AppState {
        config: Arc::new(config),
        authorizer: Authorizer::new(limiter, store),
    };
    let app = api::router(state);

    tokio::spawn(shutdown_signal(shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("bruteguard-web listening on http://{}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    // serve can also return on its own; make sure the flusher sees it
    shutdown.cancel();
    if tokio::time::timeout(shutdown_timeout, flusher).await.is_err() {
        tracing::warn!("limiter flusher did not stop within {:?}", shutdown_timeout);
    }

    tracing::info!("bruteguard-web stopped");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM and cancels `token`.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
        _ = token.cancelled() => {}
    }

    token.cancel();
}
