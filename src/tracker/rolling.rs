//! Rolling (sliding) window estimator.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// An ordered sequence of event timestamps covering one sliding window.
///
/// Timestamps are appended in non-decreasing order, so stale entries are
/// always a prefix and are popped from the front.
#[derive(Debug, Clone, Default)]
pub struct RollingWindow {
    events: VecDeque<DateTime<Utc>>,
}

impl RollingWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evict events older than `now - window`, then record one event at
    /// `now` if `increment` is set.
    ///
    /// Returns the number of live events.
    pub fn advance(&mut self, now: DateTime<Utc>, window: Duration, increment: bool) -> usize {
        let cutoff = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);

        while let Some(oldest) = self.events.front() {
            if *oldest >= cutoff {
                break;
            }
            self.events.pop_front();
        }

        if increment {
            self.events.push_back(now);
        }

        self.events.len()
    }

    /// Number of events currently held, without evicting.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are held.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recently recorded event.
    pub fn latest(&self) -> Option<DateTime<Utc>> {
        self.events.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(ms)
    }

    #[test]
    fn test_advance_records_event() {
        let mut window = RollingWindow::new();
        assert_eq!(window.advance(at(0), Duration::seconds(1), true), 1);
        assert_eq!(window.advance(at(10), Duration::seconds(1), true), 2);
        assert_eq!(window.latest(), Some(at(10)));
    }

    #[test]
    fn test_advance_without_increment_only_evicts() {
        let mut window = RollingWindow::new();
        window.advance(at(0), Duration::seconds(1), true);

        assert_eq!(window.advance(at(500), Duration::seconds(1), false), 1);
        assert_eq!(window.advance(at(1001), Duration::seconds(1), false), 0);
        assert!(window.is_empty());
    }

    #[test]
    fn test_eviction_is_strictly_older_than_cutoff() {
        let mut window = RollingWindow::new();
        window.advance(at(0), Duration::seconds(1), true);

        // cutoff == 0, event at 0 is not strictly older
        assert_eq!(window.advance(at(1000), Duration::seconds(1), false), 1);
        assert_eq!(window.advance(at(1001), Duration::seconds(1), false), 0);
    }

    #[test]
    fn test_eviction_removes_only_stale_prefix() {
        let window_len = Duration::seconds(1);
        let mut window = RollingWindow::new();
        for ms in [0, 200, 400] {
            window.advance(at(ms), window_len, true);
        }

        assert_eq!(window.advance(at(900), window_len, false), 3);
        assert_eq!(window.advance(at(1100), window_len, false), 2);
        assert_eq!(window.advance(at(1300), window_len, false), 1);
        assert_eq!(window.advance(at(1410), window_len, false), 0);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        let mut window = RollingWindow::new();
        window.advance(at(0), Duration::MAX, true);
        assert_eq!(window.advance(at(1), Duration::MAX, false), 1);
    }
}
