//! machineset-webhook - admission webhook enforcing MachineSet immutability.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads configuration from the environment
//! - Registers the MachineSet validator
//! - Starts the health server and the TLS webhook server

use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};

use machineset_webhook::health::run_health_server;
use machineset_webhook::{
    Config, HealthState, MachineSetWebhook, WebhookManager, run_webhook_server, webhook_exit_error,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("machineset_webhook=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .json()
        .init();

    info!("Starting machineset-webhook");

    let config = Config::from_env()?;

    if !Path::new(&config.cert_path).exists() || !Path::new(&config.key_path).exists() {
        error!(
            cert_path = %config.cert_path,
            key_path = %config.key_path,
            "Webhook certificates not found"
        );
        return Err("webhook certificates not found".into());
    }

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    let mut mgr = WebhookManager::new().with_health(health_state.clone());
    MachineSetWebhook::new().setup_webhook_with_manager(&mut mgr)?;

    // Start health server immediately so liveness probes pass during startup
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_handle = {
        let router = mgr.router();
        let config = config.clone();
        let health_state = health_state.clone();
        tokio::spawn(async move { run_webhook_server(router, &config, Some(health_state)).await })
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = webhook_handle => {
            let e = webhook_exit_error(result);
            error!("Webhook server error: {}", e);
            health_state.set_ready(false).await;
            return Err(e.into());
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the API server stops routing requests here
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the process cannot shut
/// down gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
