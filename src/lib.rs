//! Timerate - Per-key Event Rate Tracking
//!
//! This crate tracks how often named events occur. Callers register
//! occurrences per key and query an estimated rate (events per chosen time
//! unit) at any instant, using either a rolling window of timestamps or a
//! discrete bucketed window, without keeping unbounded history.

pub mod clock;
pub mod config;
pub mod error;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, TimeRateError};
pub use tracker::{Mode, RateTracker, TimeUnit, TrackerConfig, TrackerOptions};
