//! Clerk Relay web server.
//!
//! This binary:
//! - Receives Clerk webhooks and verifies their Svix signatures
//! - Maps recognized events to Novu workflow triggers
//! - Returns 200 once a delivery is verified, 400 otherwise
//!
//! A missing signing secret or Novu key stops the process before it binds.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clerk_relay::{router, AppState, Config, Dispatcher, NovuClient, SubscriberOptions, WebhookVerifier};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration; missing secrets are fatal
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "config_invalid");
            return Err(e).context("Invalid configuration");
        }
    };
    info!(
        port = config.port,
        novu_api_url = %config.novu_api_url,
        webhook_tolerance_secs = config.webhook_tolerance_secs,
        subscriber_prefix = %config.subscriber_prefix,
        default_locale = %config.default_locale,
        "config_loaded"
    );

    let verifier = match WebhookVerifier::new(&config.webhook_signing_secret, config.webhook_tolerance()) {
        Ok(verifier) => verifier,
        Err(e) => {
            error!(error = %e, "config_invalid");
            return Err(e).context("Invalid webhook signing secret");
        }
    };

    let novu = NovuClient::from_config(&config).context("Failed to build Novu client")?;
    let dispatcher = Dispatcher::new(Arc::new(novu), SubscriberOptions::from_config(&config));

    let state = AppState::new(verifier, dispatcher);
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
