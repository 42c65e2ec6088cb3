//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::StatusEvent;
use crate::message::DeviceMessage;
use crate::state::ListenState;

/// Externally visible listening mode of the instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Never toggled, gestures pass through as rotation payloads
    Idle,
    /// Phrase accumulation active
    Listening,
    /// Toggled off, waiting for the next toggle
    Paused,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Idle
    }
}

/// Requests from host to daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Evaluate one telemetry message
    Sample { message: DeviceMessage },

    /// Request current daemon status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to status notifications
    Subscribe,
}

/// Responses from daemon to host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Motion detected; per-axis rotation deltas
    Rotation(RotationPayload),

    /// An accumulated phrase was flushed
    Phrase { phrase: String },

    /// Sample processed, nothing to emit this cycle
    Accepted,

    /// Current daemon status
    Status(DaemonStatus),

    /// Pong response to ping
    Pong,

    /// Subscription confirmed; the connection now carries notifications
    Subscribed,

    /// Cycle rejected by validation
    Error { code: String, message: String },
}

/// Rotation output payload, using the wire field names of the original
/// device-event convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationPayload {
    #[serde(rename = "X-Rotation")]
    pub x_rotation: f64,
    #[serde(rename = "Y-Rotation")]
    pub y_rotation: f64,
    #[serde(rename = "Z-Rotation")]
    pub z_rotation: f64,
}

/// Push notification for subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A cycle produced a status badge update
    Status { event: StatusEvent },
}

/// Full daemon status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Current listening mode
    pub mode: Mode,

    /// Device this instance is bound to
    pub device_id: String,

    /// Samples evaluated since startup
    pub samples_processed: u64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

impl DaemonStatus {
    pub fn new(device_id: String) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: Mode::default(),
            device_id,
            samples_processed: 0,
            uptime_secs: 0,
        }
    }
}

/// Convert internal state to IPC Mode
impl From<ListenState> for Mode {
    fn from(state: ListenState) -> Self {
        match state {
            ListenState::Idle => Mode::Idle,
            ListenState::Listening => Mode::Listening,
            ListenState::Paused => Mode::Paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_request_deserialization() {
        let json = r#"{"type":"sample","message":{"payload":{"d":{"accelX":1.0,"accelY":2.0,"accelZ":3.0}}}}"#;
        let req: Request = serde_json::from_str(json).unwrap();
        match req {
            Request::Sample { message } => {
                let sample = message.device_event().unwrap().sample().unwrap();
                assert_eq!(sample.x, 1.0);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_rotation_response_field_names() {
        let resp = Response::Rotation(RotationPayload {
            x_rotation: 1.5,
            y_rotation: 0.0,
            z_rotation: -0.5,
        });
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("rotation"));
        assert!(json.contains("\"X-Rotation\":1.5"));
        assert!(json.contains("\"Z-Rotation\":-0.5"));
    }

    #[test]
    fn test_notification_serialization() {
        let notif = Notification::Status {
            event: StatusEvent::Sent,
        };
        let json = serde_json::to_string(&notif).unwrap();
        assert!(json.contains("status"));
        assert!(json.contains("sent"));
    }

    #[test]
    fn test_status_snapshot_defaults() {
        let status = DaemonStatus::new("tag-1".to_string());
        assert_eq!(status.mode, Mode::Idle);
        assert_eq!(status.samples_processed, 0);
        assert_eq!(status.device_id, "tag-1");
    }
}
