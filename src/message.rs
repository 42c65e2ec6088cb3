//! Input envelope and validation for device telemetry
//!
//! Messages follow the SensorTag convention: the device event rides at
//! `payload.d` with three rotational acceleration fields. A secondary data
//! source names the same fields `acc_x`/`acc_y`/`acc_z`; those are accepted
//! transparently via serde aliases.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A single telemetry message from the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceMessage {
    /// Message payload; absent on malformed input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// Message payload wrapping the device event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payload {
    /// Device event data, `d` in the SensorTag envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<DeviceEvent>,
}

/// Raw device event carrying tri-axial acceleration
///
/// Fields are kept optional so validation can distinguish an absent axis
/// from a present one. A `0` reading counts as missing, matching the
/// upstream falsy check.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DeviceEvent {
    #[serde(default, alias = "acc_x", rename = "accelX")]
    pub accel_x: Option<f64>,
    #[serde(default, alias = "acc_y", rename = "accelY")]
    pub accel_y: Option<f64>,
    #[serde(default, alias = "acc_z", rename = "accelZ")]
    pub accel_z: Option<f64>,
}

/// A normalized point-in-time reading of the three axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl DeviceMessage {
    /// Validate the envelope and return the inner device event
    pub fn device_event(&self) -> Result<&DeviceEvent, PipelineError> {
        self.payload
            .as_ref()
            .and_then(|p| p.d.as_ref())
            .ok_or(PipelineError::MissingDeviceEvent)
    }
}

impl DeviceEvent {
    /// Normalize the event into a [`Sample`]
    ///
    /// Fails when any axis is absent or falsy.
    pub fn sample(&self) -> Result<Sample, PipelineError> {
        Ok(Sample {
            x: truthy(self.accel_x)?,
            y: truthy(self.accel_y)?,
            z: truthy(self.accel_z)?,
        })
    }
}

fn truthy(axis: Option<f64>) -> Result<f64, PipelineError> {
    match axis {
        Some(v) if v != 0.0 => Ok(v),
        _ => Err(PipelineError::MissingRotationalAcceleration),
    }
}
