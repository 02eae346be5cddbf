//! Configuration management for timerate.
//!
//! The core takes already-validated [`TrackerOptions`]; this module loads a
//! set of them, plus logging settings, from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::{Result, TimeRateError};
use crate::tracker::{RateTracker, TrackerOptions};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRateConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Trackers to initialize
    #[serde(default)]
    pub trackers: Vec<TrackerOptions>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TimeRateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading timerate configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| TimeRateError::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Initialize every configured tracker on `tracker`.
    ///
    /// Stops at the first invalid entry.
    pub fn apply<C: Clock>(&self, tracker: &RateTracker<C>) -> Result<()> {
        for options in &self.trackers {
            tracker.init(options.clone())?;
        }
        Ok(())
    }
}
