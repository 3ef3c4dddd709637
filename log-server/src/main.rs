//! Log Server - authenticated log dump ingestion endpoint.
//!
//! This binary serves `PUT /dump`: bearer tokens are resolved against a JSON
//! token file, dumps are written below a directory, and in notify mode each
//! dump is announced by email through Mailgun.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logserver::{router, AppState, Config, FsBlobStore, JsonFileTokenStore, MailgunMailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("log_server_starting");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        port = config.port,
        mode = %config.mode,
        tokens_path = %config.tokens_path.display(),
        dump_dir = %config.dump_dir.display(),
        max_dump_bytes = config.max_dump_bytes,
        mailgun_configured = config.mailgun_api_key.is_some(),
        mailgun_domain = ?config.mailgun_domain,
        "config_loaded"
    );

    let tokens = Arc::new(JsonFileTokenStore::new(&config.tokens_path));
    let blobs = Arc::new(FsBlobStore::new(&config.dump_dir));
    let mut state = AppState::new(config.clone(), tokens, blobs);

    if config.mode.notifies() {
        // `validate` guarantees both settings in notify mode.
        if let (Some(api_key), Some(domain)) = (&config.mailgun_api_key, &config.mailgun_domain) {
            let mailer = MailgunMailer::new(
                &config.mailgun_base_url,
                domain,
                api_key.clone(),
                Duration::from_millis(config.request_timeout_ms),
            )
            .context("Failed to create Mailgun client")?;
            info!(endpoint = %mailer.endpoint(), "mailgun_mailer_created");
            state = state.with_mailer(Arc::new(mailer));
        }
    }

    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "log_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("log_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
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

    info!("log_server_shutting_down");
}
