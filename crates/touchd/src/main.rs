//! Touchd daemon - Touch pHAT front end for the rpi-kvm service
//!
//! Runs unattended on the Pi: probes for the panel, keeps a session to
//! the KVM service, and forwards configured button actions to it.
//!
//! # Usage
//!
//! ```bash
//! # Run in the foreground (normally started by systemd)
//! touchd
//!
//! # Enable debug logging
//! RUST_LOG=touchd=debug touchd
//! ```
//!
//! No CLI flags and no local configuration: the button mapping is
//! fetched from the KVM service over D-Bus. Exits 0 when no panel is
//! present or after SIGTERM/SIGINT; otherwise runs indefinitely.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use touchd::dispatcher::ButtonDispatcher;
use touchd::panel::{ButtonPanel, Cap1166Panel};
use touchd::service::SystemBus;
use touchd::session::SessionManager;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("touchd=info".parse()?)
                .add_directive("touchd_core=info".parse()?),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Touchd daemon starting"
    );

    let mut panel = Cap1166Panel::probe();
    info!(present = panel.is_present(), "Touch pHAT present");

    let cancel_token = CancellationToken::new();

    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    let session = Arc::new(SessionManager::with_defaults(SystemBus));
    let mut dispatcher = ButtonDispatcher::new(&mut panel, session, cancel_token);
    dispatcher.run().await;

    info!("Touchd daemon stopped");
    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT");
        }
    }

    Ok(())
}
