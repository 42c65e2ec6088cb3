//! Unix domain socket server for IPC
//!
//! Accepts telemetry samples as requests, runs the classification pipeline
//! one message at a time, and pushes per-cycle status notifications to
//! subscribed clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::error::PipelineError;
use crate::events::StatusEvent;
use crate::pipeline::{Output, Pipeline};

use super::protocol::{DaemonStatus, Notification, Request, Response, RotationPayload};

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    status_tx: broadcast::Sender<StatusEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Shared server state
///
/// The pipeline lives behind the same lock as the status snapshot, so
/// samples are evaluated strictly one at a time.
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
    pipeline: Pipeline,
}

impl Server {
    /// Create a new IPC server owning the pipeline instance
    pub fn new(
        socket_path: &Path,
        pipeline: Pipeline,
        device_id: String,
        status_tx: broadcast::Sender<StatusEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::new(device_id),
            start_time: std::time::Instant::now(),
            pipeline,
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            status_tx,
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let status_tx = self.status_tx.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, status_tx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    ///
    /// Request-response until the client subscribes; after that the
    /// connection carries status notifications until it closes.
    async fn handle_client(
        mut stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        status_tx: broadcast::Sender<StatusEvent>,
    ) -> Result<()> {
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match stream.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > 1024 * 1024 {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            stream.read_exact(&mut msg_buf).await?;

            // Parse request
            let request: Request =
                serde_json::from_slice(&msg_buf).context("failed to parse request")?;

            debug!(?request, "received request");

            // Process request
            let (response, subscribe) = Self::process_request(request, &state, &status_tx).await;

            // Send response
            Self::send_message(&mut stream, &response).await?;

            if subscribe {
                debug!("client subscribed to notifications");
                return Self::push_notifications(stream, status_tx.subscribe()).await;
            }
        }
    }

    /// Forward broadcast status events to a subscribed client
    async fn push_notifications(
        mut stream: UnixStream,
        mut status_rx: broadcast::Receiver<StatusEvent>,
    ) -> Result<()> {
        loop {
            match status_rx.recv().await {
                Ok(event) => {
                    let notification = Notification::Status { event };
                    if Self::send_message(&mut stream, &notification).await.is_err() {
                        debug!("subscriber disconnected");
                        return Ok(());
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged, notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Ok(());
                }
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<T: serde::Serialize>(stream: &mut UnixStream, msg: &T) -> Result<()> {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        status_tx: &broadcast::Sender<StatusEvent>,
    ) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let mut state = state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                (Response::Status(state.status.clone()), false)
            }

            Request::Sample { message } => {
                let _ = status_tx.send(StatusEvent::Processing);

                let mut state = state.write().await;
                state.status.samples_processed += 1;

                match state.pipeline.process(&message) {
                    Ok(cycle) => {
                        state.status.mode = state.pipeline.state().into();
                        let _ = status_tx.send(cycle.status);

                        let response = match cycle.output {
                            Some(Output::Rotation { dx, dy, dz }) => {
                                Response::Rotation(RotationPayload {
                                    x_rotation: dx,
                                    y_rotation: dy,
                                    z_rotation: dz,
                                })
                            }
                            Some(Output::Phrase(phrase)) => {
                                info!(%phrase, "phrase flushed");
                                Response::Phrase { phrase }
                            }
                            None => Response::Accepted,
                        };
                        (response, false)
                    }
                    Err(e) => {
                        let _ = status_tx.send(StatusEvent::Error {
                            message: e.to_string(),
                        });
                        (Self::error_response(&e), false)
                    }
                }
            }

            Request::Subscribe => (Response::Subscribed, true),
        }
    }

    fn error_response(error: &PipelineError) -> Response {
        Response::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
