//! Per-key window state, shaped by the key's mode.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::discrete::DiscreteWindow;
use super::options::Mode;
use super::rolling::RollingWindow;

/// Estimator state of one key.
#[derive(Debug, Clone)]
pub enum WindowState {
    /// Timestamps of every event in the sliding window
    Rolling(RollingWindow),
    /// Open bucket plus the last sealed count
    Discrete(DiscreteWindow),
}

impl WindowState {
    /// Fresh state for `mode`, created at `now`.
    pub fn new(mode: Mode, now: DateTime<Utc>) -> Self {
        match mode {
            Mode::Rolling => WindowState::Rolling(RollingWindow::new()),
            Mode::Discrete => WindowState::Discrete(DiscreteWindow::new(now)),
        }
    }

    /// Advance to `now`, recording one event if `increment` is set.
    ///
    /// Returns the count a rate is computed from: live events for rolling
    /// windows, the last completed bucket for discrete ones.
    pub fn advance(&mut self, now: DateTime<Utc>, window: Duration, increment: bool) -> u64 {
        match self {
            WindowState::Rolling(rolling) => rolling.advance(now, window, increment) as u64,
            WindowState::Discrete(discrete) => discrete.advance(now, window, increment),
        }
    }
}

/// Window state plus the latest instant the key has observed.
///
/// Instants earlier than the latest one are clamped to it, so rolling
/// timestamps stay ordered and discrete buckets never rewind.
#[derive(Debug, Clone)]
pub(crate) struct KeyState {
    latest: DateTime<Utc>,
    window: WindowState,
}

impl KeyState {
    pub(crate) fn new(mode: Mode, now: DateTime<Utc>) -> Self {
        Self {
            latest: now,
            window: WindowState::new(mode, now),
        }
    }

    pub(crate) fn advance(&mut self, now: DateTime<Utc>, window: Duration, increment: bool) -> u64 {
        let now = if now < self.latest {
            debug!(
                now = %now,
                latest = %self.latest,
                "Clock moved backwards, clamping to latest observed instant"
            );
            self.latest
        } else {
            self.latest = now;
            now
        };

        self.window.advance(now, window, increment)
    }

    #[cfg(test)]
    pub(crate) fn window(&self) -> &WindowState {
        &self.window
    }
}
