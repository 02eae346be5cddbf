//! Keyed registry dispatching to the per-key estimators.

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::options::{TrackerConfig, TrackerOptions};
use super::window::KeyState;
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TimeRateError};

/// Configuration and state of one initialized key.
struct TrackedKey {
    config: TrackerConfig,
    state: Mutex<KeyState>,
}

/// Tracks event rates for any number of independently configured keys.
///
/// Keys must be initialized with [`RateTracker::init`] before use. This
/// struct is thread-safe; updates to a single key are serialized while
/// different keys proceed in parallel.
pub struct RateTracker<C: Clock = SystemClock> {
    clock: C,
    keys: DashMap<String, TrackedKey>,
}

impl RateTracker<SystemClock> {
    /// Create a tracker driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for RateTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RateTracker<C> {
    /// Create a tracker driven by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            keys: DashMap::new(),
        }
    }

    /// Initialize (or re-initialize) a key.
    ///
    /// Re-initializing discards all history recorded for the key.
    pub fn init(&self, options: TrackerOptions) -> Result<()> {
        let config = options.resolve()?;
        let state = KeyState::new(config.mode(), self.clock.now());

        debug!(
            key = %config.key(),
            mode = %config.mode(),
            window_ms = config.window().num_milliseconds(),
            rate_per = %config.rate_per(),
            "Initializing rate tracker"
        );

        let key = config.key().to_string();
        let previous = self.keys.insert(
            key.clone(),
            TrackedKey {
                config,
                state: Mutex::new(state),
            },
        );

        if previous.is_some() {
            debug!(key = %key, "Re-initialized key, previous history discarded");
        }

        Ok(())
    }

    /// Record one event for `key` at the current instant.
    pub fn register(&self, key: &str) -> Result<()> {
        let count = self.advance(key, true)?;
        trace!(key = %key, count = count, "Registered event");
        Ok(())
    }

    /// Current rate of `key`, in events per the key's `rate_per` unit.
    ///
    /// Applies any pending eviction or rollover without recording an event.
    pub fn rate(&self, key: &str) -> Result<f64> {
        let tracked = self.tracked(key)?;
        let count = tracked
            .state
            .lock()
            .advance(self.clock.now(), tracked.config.window(), false);
        let rate = count as f64 * tracked.config.rate_scale();

        trace!(key = %key, count = count, rate = rate, "Computed rate");
        Ok(rate)
    }

    /// Whether `key` has been initialized.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Resolved configuration of `key`, if initialized.
    pub fn config(&self, key: &str) -> Option<TrackerConfig> {
        self.keys.get(key).map(|tracked| tracked.config.clone())
    }

    /// Number of initialized keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no key has been initialized.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The clock driving this tracker.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn advance(&self, key: &str, increment: bool) -> Result<u64> {
        let tracked = self.tracked(key)?;
        let count = tracked
            .state
            .lock()
            .advance(self.clock.now(), tracked.config.window(), increment);
        Ok(count)
    }

    fn tracked(&self, key: &str) -> Result<dashmap::mapref::one::Ref<'_, String, TrackedKey>> {
        self.keys
            .get(key)
            .ok_or_else(|| TimeRateError::UnknownKey(key.to_string()))
    }
}
