//! `credgate` - HTTP gateway for user registration and credential validation.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::net::SocketAddr;

use anyhow::Context;
use credgate::{AppState, ServerConfig, router};
use credgate_core::{CredentialGateway, UserRepository};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credgate=info,credgate_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting credgate");

    let config = ServerConfig::from_env().context("invalid configuration")?;
    for var in &config.missing_store_vars {
        warn!("Environment variable {var} is not set, using default");
    }
    info!("Store configuration: {:?}", config.store);

    let repo = UserRepository::connect_lazy(&config.store)?;
    // The server still starts when the store is down; /health reports it.
    if let Err(e) = repo.initialize().await {
        warn!("Could not initialize user table: {e}");
    }

    let addr = config.socket_addr();
    let debug_endpoints = config.debug_endpoints;
    let state = AppState::new(CredentialGateway::new(repo.clone()), config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}");
    if debug_endpoints {
        warn!("Debug endpoints enabled (loopback only)");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    repo.close().await;
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
