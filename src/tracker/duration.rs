//! Conversion of `(scalar, unit)` pairs into absolute time spans.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::TimeRateError;

const MICROS_PER_MILLISECOND: f64 = 1_000.0;
const MICROS_PER_SECOND: f64 = 1_000_000.0;
const MICROS_PER_DAY: f64 = 86_400.0 * MICROS_PER_SECOND;

/// Time unit for window lengths and rate denominators.
///
/// Month, quarter and year have fixed lengths (30, 91 and 365 days). They
/// are not calendar aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[serde(alias = "milliseconds", alias = "ms")]
    Millisecond,
    #[serde(alias = "seconds")]
    Second,
    #[serde(alias = "minutes")]
    Minute,
    #[serde(alias = "hours")]
    Hour,
    #[serde(alias = "days")]
    Day,
    #[serde(alias = "weeks")]
    Week,
    #[serde(alias = "months")]
    Month,
    #[serde(alias = "quarters")]
    Quarter,
    #[serde(alias = "years")]
    Year,
}

impl TimeUnit {
    /// Length of one unit in microseconds.
    fn micros(&self) -> f64 {
        match self {
            TimeUnit::Millisecond => MICROS_PER_MILLISECOND,
            TimeUnit::Second => MICROS_PER_SECOND,
            TimeUnit::Minute => 60.0 * MICROS_PER_SECOND,
            TimeUnit::Hour => 3_600.0 * MICROS_PER_SECOND,
            TimeUnit::Day => MICROS_PER_DAY,
            TimeUnit::Week => 7.0 * MICROS_PER_DAY,
            TimeUnit::Month => 30.0 * MICROS_PER_DAY,
            TimeUnit::Quarter => 91.0 * MICROS_PER_DAY,
            TimeUnit::Year => 365.0 * MICROS_PER_DAY,
        }
    }

    /// Duration of a single unit.
    pub fn duration(&self) -> Duration {
        resolve(1.0, *self)
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Millisecond => "millisecond",
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Year => "year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = TimeRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Ok(TimeUnit::Millisecond),
            "second" | "seconds" => Ok(TimeUnit::Second),
            "minute" | "minutes" => Ok(TimeUnit::Minute),
            "hour" | "hours" => Ok(TimeUnit::Hour),
            "day" | "days" => Ok(TimeUnit::Day),
            "week" | "weeks" => Ok(TimeUnit::Week),
            "month" | "months" => Ok(TimeUnit::Month),
            "quarter" | "quarters" => Ok(TimeUnit::Quarter),
            "year" | "years" => Ok(TimeUnit::Year),
            other => Err(TimeRateError::Configuration(format!(
                "unrecognized time unit: {:?}",
                other
            ))),
        }
    }
}

/// Resolve `scalar` units of `unit` into a duration with microsecond precision.
///
/// Negative and NaN scalars resolve to zero. Spans beyond the representable
/// range saturate.
pub fn resolve(scalar: f64, unit: TimeUnit) -> Duration {
    let micros = (scalar.max(0.0) * unit.micros()).round();
    // `as` saturates at i64::MAX for out-of-range floats.
    Duration::microseconds(micros as i64)
}

/// Duration expressed as fractional milliseconds.
pub(crate) fn as_millis_f64(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(us) => us as f64 / MICROS_PER_MILLISECOND,
        None => duration.num_milliseconds() as f64,
    }
}
