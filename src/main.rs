//! rotation-phrase-daemon: classifies SensorTag rotation gestures into phrases
//!
//! The daemon accepts tri-axial acceleration samples over a Unix socket,
//! detects discrete rotation/tilt events against the previous sample,
//! classifies them into pitch/roll gestures, and accumulates a spoken
//! phrase between start/stop toggle gestures. Per-cycle status badges are
//! pushed to subscribed clients.

mod classify;
mod config;
mod error;
mod events;
mod ipc;
mod lifecycle;
mod message;
mod motion;
mod pipeline;
mod state;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::events::StatusEvent;
use crate::ipc::Server;
use crate::pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "rotation-phrase-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(
        ?config.socket_path,
        device_id = %config.settings.device_id,
        sensitivity = config.settings.sensitivity,
        start_toggle = config.settings.start_toggle,
        "configuration loaded"
    );

    // Channel for per-cycle status events
    let (status_tx, mut status_rx) = broadcast::channel::<StatusEvent>(64);

    // One pipeline instance, bound to one device
    let pipeline = Pipeline::new(&config.settings);

    // IPC server owns the pipeline and broadcasts its statuses
    let server = Server::new(
        &config.socket_path,
        pipeline,
        config.settings.device_id.clone(),
        status_tx,
    )?;

    info!("daemon initialized, entering main loop");

    // Main event loop
    tokio::select! {
        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                warn!(?e, "IPC server error");
            }
        }

        // Log status events as cycles complete
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(event) => {
                        debug!(%event, "status");
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "status event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        } => {
            info!("status event handler exited");
        }

        // Wait for shutdown signal
        signal = lifecycle::shutdown::wait() => {
            info!(signal, "shutdown signal received");
        }
    }

    // Cleanup
    info!("shutting down...");

    server.shutdown().await;

    info!("rotation-phrase-daemon stopped");

    Ok(())
}
