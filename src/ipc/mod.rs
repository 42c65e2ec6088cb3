//! IPC module for host communication

mod protocol;
mod server;

pub use protocol::{DaemonStatus, Mode, Notification, Request, Response, RotationPayload};
pub use server::Server;
