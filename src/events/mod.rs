//! Status events reported to the host after each cycle
//!
//! The Rust rendering of the flow-editor status badge: one indicator per
//! cycle, purely observational, never consumed by the pipeline itself.

use serde::{Deserialize, Serialize};

/// Per-cycle status indicator pushed to subscribed clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A sample is being evaluated
    Processing,

    /// Phrase accumulation is active
    Listening,

    /// An accumulated phrase was flushed to the output
    Sent,

    /// Cycle finished with nothing to report; badge cleared
    Cleared,

    /// Validation rejected the cycle
    Error {
        /// Human-readable failure reason
        message: String,
    },
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusEvent::Processing => write!(f, "Processing"),
            StatusEvent::Listening => write!(f, "Listening..."),
            StatusEvent::Sent => write!(f, "Sent"),
            StatusEvent::Cleared => write!(f, ""),
            StatusEvent::Error { message } => write!(f, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = StatusEvent::Error {
            message: "Missing device event".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Missing device event"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"listening"}"#;
        let event: StatusEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, StatusEvent::Listening));
    }

    #[test]
    fn test_display_matches_badge_text() {
        assert_eq!(StatusEvent::Listening.to_string(), "Listening...");
        assert_eq!(StatusEvent::Cleared.to_string(), "");
    }
}
