//! Signal handling for graceful shutdown

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Wait for SIGTERM or SIGINT, returning the signal name for logging
pub async fn wait() -> &'static str {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            debug!("received SIGTERM");
            "SIGTERM"
        }
        _ = sigint.recv() => {
            debug!("received SIGINT");
            "SIGINT"
        }
    }
}
