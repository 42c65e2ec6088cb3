//! Configuration loading and management
//!
//! Settings come from a JSON file in the daemon's data directory (or the
//! path named by `ROTATION_PHRASE_CONFIG`). Sensitivity follows the flow
//! convention of a stringified number with a 0.5 default; the toggle code
//! and device id are required.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::error::PipelineError;

/// Default motion sensitivity threshold when none is configured
pub const DEFAULT_SENSITIVITY: f64 = 0.5;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Resolved pipeline settings
    pub settings: Settings,
}

/// Validated, immutable per-instance settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Minimum |delta| for an axis to count as moved
    pub sensitivity: f64,

    /// Composite code that starts/stops phrase accumulation
    pub start_toggle: u16,

    /// Opaque identifier binding this instance to one device
    pub device_id: String,

    /// Per-code phrase fragment overrides for the gesture table
    pub fragment_overrides: HashMap<u16, String>,
}

/// On-disk shape of the settings file, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    /// Stringified sensitivity threshold; absent means 0.5
    #[serde(default)]
    pub sensitivity: Option<String>,

    /// Toggle composite code (required)
    #[serde(default)]
    pub start_toggle: Option<u16>,

    /// Device identifier (required)
    #[serde(default)]
    pub device_id: Option<String>,

    /// Optional `code → fragment` overrides, keyed by the code as text
    #[serde(default)]
    pub phrases: HashMap<String, String>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("rotation-phrase");

        let socket_path = data_dir.join("daemon.sock");

        let config_path = std::env::var("ROTATION_PHRASE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("config.json"));

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file {}", config_path.display()))?;
        let raw: RawSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", config_path.display()))?;
        let settings = Settings::resolve(raw)?;

        Ok(Self {
            socket_path,
            data_dir,
            settings,
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Settings {
    /// Validate raw settings into usable form
    pub fn resolve(raw: RawSettings) -> Result<Self, PipelineError> {
        let sensitivity = match raw.sensitivity.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_SENSITIVITY,
            Some(text) => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PipelineError::InvalidSensitivity(text.to_string()))?,
        };

        let start_toggle = raw
            .start_toggle
            .ok_or(PipelineError::MissingRequiredConfig("start_toggle"))?;

        let device_id = raw
            .device_id
            .filter(|id| !id.is_empty())
            .ok_or(PipelineError::MissingRequiredConfig("device_id"))?;

        let mut fragment_overrides = HashMap::new();
        for (key, fragment) in raw.phrases {
            match key.parse::<u16>() {
                Ok(code) => {
                    fragment_overrides.insert(code, fragment);
                }
                Err(_) => {
                    warn!(%key, "ignoring phrase override with non-numeric code");
                }
            }
        }

        Ok(Self {
            sensitivity,
            start_toggle,
            device_id,
            fragment_overrides,
        })
    }
}
