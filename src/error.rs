//! Validation error taxonomy for the classification pipeline
//!
//! All variants are validation-time and terminal for the current cycle only;
//! they are surfaced to the host as human-readable status text and never
//! halt the instance.

/// Reasons a cycle can be rejected before any state mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// The message carried no device event payload
    #[error("Missing device event")]
    MissingDeviceEvent,

    /// One or more acceleration axes were absent or falsy
    #[error("Missing rotational acceleration")]
    MissingRotationalAcceleration,

    /// The configured sensitivity did not parse as a number
    #[error("Invalid sensitivity: {0}")]
    InvalidSensitivity(String),

    /// A required configuration field was absent
    #[error("Missing required config: {0}")]
    MissingRequiredConfig(&'static str),
}

impl PipelineError {
    /// Stable machine-readable code for the IPC error response
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MissingDeviceEvent => "missing_device_event",
            PipelineError::MissingRotationalAcceleration => "missing_rotational_acceleration",
            PipelineError::InvalidSensitivity(_) => "invalid_sensitivity",
            PipelineError::MissingRequiredConfig(_) => "missing_required_config",
        }
    }
}
