//! Per-key tracker options and their resolved configuration.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::duration::{as_millis_f64, resolve, TimeUnit};
use crate::error::{Result, TimeRateError};

/// Default estimation mode.
const DEFAULT_MODE: Mode = Mode::Discrete;
/// Default rate denominator.
const DEFAULT_RATE_PER: TimeUnit = TimeUnit::Second;
/// Default window length, in `DEFAULT_WINDOW_UNIT`s.
const DEFAULT_WINDOW_LENGTH: f64 = 10.0;
/// Default window unit.
const DEFAULT_WINDOW_UNIT: TimeUnit = TimeUnit::Second;

/// Estimation algorithm for a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Sliding window over individual event timestamps
    Rolling,
    /// Fixed-length buckets publishing the last completed bucket's count
    #[default]
    Discrete,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Rolling => f.write_str("rolling"),
            Mode::Discrete => f.write_str("discrete"),
        }
    }
}

impl FromStr for Mode {
    type Err = TimeRateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rolling" => Ok(Mode::Rolling),
            "discrete" => Ok(Mode::Discrete),
            other => Err(TimeRateError::Configuration(format!(
                "unrecognized mode: {:?}",
                other
            ))),
        }
    }
}

/// Caller-supplied options for a key. Only `key` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerOptions {
    /// Unique identifier of the tracked event
    pub key: String,
    /// Estimation mode
    #[serde(default)]
    pub mode: Option<Mode>,
    /// Unit of the reported rate's denominator
    #[serde(default, alias = "ratePer")]
    pub rate_per: Option<TimeUnit>,
    /// Window length, in `window_unit`s
    #[serde(default, alias = "windowLength")]
    pub window_length: Option<f64>,
    /// Unit of `window_length`
    #[serde(default, alias = "windowUnit")]
    pub window_unit: Option<TimeUnit>,
}

impl TrackerOptions {
    /// Options for `key` with every other field left to its default.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            mode: None,
            rate_per: None,
            window_length: None,
            window_unit: None,
        }
    }

    /// Set the estimation mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the rate denominator.
    pub fn rate_per(mut self, unit: TimeUnit) -> Self {
        self.rate_per = Some(unit);
        self
    }

    /// Set the window to `length` units of `unit`.
    pub fn window(mut self, length: f64, unit: TimeUnit) -> Self {
        self.window_length = Some(length);
        self.window_unit = Some(unit);
        self
    }

    /// Merge over the defaults and validate.
    pub fn resolve(self) -> Result<TrackerConfig> {
        if self.key.trim().is_empty() {
            return Err(TimeRateError::Configuration(
                "tracker key must not be empty".to_string(),
            ));
        }

        let window_length = self.window_length.unwrap_or(DEFAULT_WINDOW_LENGTH);
        if !window_length.is_finite() || window_length <= 0.0 {
            return Err(TimeRateError::Configuration(format!(
                "window length for {:?} must be a positive number, got {}",
                self.key, window_length
            )));
        }

        let window_unit = self.window_unit.unwrap_or(DEFAULT_WINDOW_UNIT);
        let window = resolve(window_length, window_unit);
        if window <= Duration::zero() {
            return Err(TimeRateError::Configuration(format!(
                "window for {:?} is shorter than the supported precision",
                self.key
            )));
        }

        Ok(TrackerConfig {
            key: self.key,
            mode: self.mode.unwrap_or(DEFAULT_MODE),
            rate_per: self.rate_per.unwrap_or(DEFAULT_RATE_PER),
            window_length,
            window_unit,
            window,
        })
    }
}

/// Resolved, immutable configuration of a key.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    key: String,
    mode: Mode,
    rate_per: TimeUnit,
    window_length: f64,
    window_unit: TimeUnit,
    window: Duration,
}

impl TrackerConfig {
    /// The tracked key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Estimation mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Rate denominator.
    pub fn rate_per(&self) -> TimeUnit {
        self.rate_per
    }

    /// Window length in `window_unit()`s.
    pub fn window_length(&self) -> f64 {
        self.window_length
    }

    /// Unit of the window length.
    pub fn window_unit(&self) -> TimeUnit {
        self.window_unit
    }

    /// Absolute window duration.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Factor converting "events per window" into "events per `rate_per`".
    pub fn rate_scale(&self) -> f64 {
        as_millis_f64(self.rate_per.duration()) / as_millis_f64(self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = TrackerOptions::new("heartbeat").resolve().unwrap();

        assert_eq!(config.key(), "heartbeat");
        assert_eq!(config.mode(), Mode::Discrete);
        assert_eq!(config.rate_per(), TimeUnit::Second);
        assert_eq!(config.window_length(), 10.0);
        assert_eq!(config.window_unit(), TimeUnit::Second);
        assert_eq!(config.window(), Duration::seconds(10));
    }

    #[test]
    fn test_supplied_fields_override_defaults() {
        let config = TrackerOptions::new("heartbeat")
            .mode(Mode::Rolling)
            .rate_per(TimeUnit::Minute)
            .window(1.0, TimeUnit::Minute)
            .resolve()
            .unwrap();

        assert_eq!(config.mode(), Mode::Rolling);
        assert_eq!(config.rate_per(), TimeUnit::Minute);
        assert_eq!(config.window(), Duration::seconds(60));
        assert_eq!(config.rate_scale(), 1.0);
    }

    #[test]
    fn test_rate_scale() {
        let config = TrackerOptions::new("k").resolve().unwrap();
        assert!((config.rate_scale() - 0.1).abs() < 1e-12);

        let config = TrackerOptions::new("k")
            .rate_per(TimeUnit::Minute)
            .window(30.0, TimeUnit::Second)
            .resolve()
            .unwrap();
        assert_eq!(config.rate_scale(), 2.0);
    }

    #[test]
    fn test_empty_key_rejected() {
        for key in ["", "   "] {
            let err = TrackerOptions::new(key).resolve().unwrap_err();
            assert!(matches!(err, TimeRateError::Configuration(_)));
        }
    }

    #[test]
    fn test_invalid_window_rejected() {
        for length in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-9] {
            let err = TrackerOptions::new("k")
                .window(length, TimeUnit::Second)
                .resolve()
                .unwrap_err();
            assert!(matches!(err, TimeRateError::Configuration(_)));
        }
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("rolling".parse::<Mode>().unwrap(), Mode::Rolling);
        assert_eq!("Discrete".parse::<Mode>().unwrap(), Mode::Discrete);
        assert!(matches!(
            "bursty".parse::<Mode>().unwrap_err(),
            TimeRateError::Configuration(_)
        ));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: TrackerOptions = serde_json::from_str(r#"{"key": "clicks"}"#).unwrap();
        assert_eq!(options, TrackerOptions::new("clicks"));

        let options: TrackerOptions = serde_json::from_str(
            r#"{"key": "clicks", "mode": "rolling", "ratePer": "minutes", "windowLength": 5, "windowUnit": "minute"}"#,
        )
        .unwrap();
        let config = options.resolve().unwrap();
        assert_eq!(config.mode(), Mode::Rolling);
        assert_eq!(config.rate_per(), TimeUnit::Minute);
        assert_eq!(config.window(), Duration::minutes(5));
    }

    #[test]
    fn test_unknown_unit_fails_to_deserialize() {
        let result =
            serde_json::from_str::<TrackerOptions>(r#"{"key": "clicks", "rate_per": "fortnight"}"#);
        assert!(result.is_err());
    }
}
