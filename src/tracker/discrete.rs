//! Discrete (bucketed) window estimator.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

/// A fixed-length bucket plus the sealed count of the bucket before it.
///
/// `window_start` is always the start of the open bucket. `current_count`
/// only counts events since then, and `previous_count` only changes when a
/// bucket closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscreteWindow {
    window_start: DateTime<Utc>,
    current_count: u64,
    previous_count: u64,
}

impl DiscreteWindow {
    /// Open an empty bucket starting at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            window_start: start,
            current_count: 0,
            previous_count: 0,
        }
    }

    /// Apply any pending rollover for `now`, then count one event in the
    /// open bucket if `increment` is set.
    ///
    /// Returns the count of the last completed bucket.
    pub fn advance(&mut self, now: DateTime<Utc>, window: Duration, increment: bool) -> u64 {
        let increment_by = u64::from(increment);

        let Some(bucket_end) = self.window_start.checked_add_signed(window) else {
            self.current_count = self.current_count.saturating_add(increment_by);
            return self.previous_count;
        };

        if now < bucket_end {
            self.current_count = self.current_count.saturating_add(increment_by);
            return self.previous_count;
        }

        let next_end = bucket_end.checked_add_signed(window);
        if next_end.is_some_and(|next_end| now < next_end) {
            trace!(
                window_start = %bucket_end,
                sealed_count = self.current_count,
                "Rolling over to next bucket"
            );
            self.window_start = bucket_end;
            self.previous_count = self.current_count;
            self.current_count = increment_by;
            return self.previous_count;
        }

        // Idle for two windows or more: every skipped bucket would read zero,
        // so restart the phase at `now`.
        trace!(
            window_start = %now,
            "Idle for multiple windows, resetting bucket"
        );
        self.window_start = now;
        self.previous_count = 0;
        self.current_count = increment_by;
        self.previous_count
    }

    /// Start of the open bucket.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// Events counted in the open bucket so far.
    pub fn current_count(&self) -> u64 {
        self.current_count
    }

    /// Events counted in the last completed bucket.
    pub fn previous_count(&self) -> u64 {
        self.previous_count
    }
}
