//! Periodic progress logging for single-pass record processing.

use log::info;

use crate::logging::format_count;

/// Default number of items between progress messages.
pub const DEFAULT_INTERVAL: u64 = 1_000_000;

/// Counts processed items and logs a line each time the count crosses a multiple of the
/// interval.
///
/// ```
/// use mateflow_lib::progress::ProgressTracker;
///
/// let mut tracker = ProgressTracker::new("Read records").with_interval(100);
/// for _ in 0..250 {
///     tracker.add(1); // logs at 100 and 200
/// }
/// tracker.finish(); // logs "Read records 250 (complete)"
/// assert_eq!(tracker.count(), 250);
/// ```
#[derive(Debug)]
pub struct ProgressTracker {
    message: String,
    interval: u64,
    count: u64,
}

impl ProgressTracker {
    /// A tracker with the default interval.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), interval: DEFAULT_INTERVAL, count: 0 }
    }

    /// Sets the logging interval. Zero is treated as one.
    #[must_use]
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Adds `n` items, logging once per interval boundary crossed.
    pub fn add(&mut self, n: u64) {
        let before = self.count / self.interval;
        self.count += n;
        for milestone in (before + 1)..=(self.count / self.interval) {
            info!("{} {}", self.message, format_count(milestone * self.interval));
        }
    }

    /// Logs the final count unless the last boundary already reported it.
    pub fn finish(&self) {
        if self.count > 0 && self.count % self.interval != 0 {
            info!("{} {} (complete)", self.message, format_count(self.count));
        }
    }

    /// Items counted so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tracker = ProgressTracker::new("Records");
        assert_eq!(tracker.interval, DEFAULT_INTERVAL);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn test_add_accumulates_across_boundaries() {
        let mut tracker = ProgressTracker::new("Records").with_interval(10);
        tracker.add(35);
        tracker.add(5);
        assert_eq!(tracker.count(), 40);
        tracker.finish();
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let mut tracker = ProgressTracker::new("Records").with_interval(0);
        tracker.add(3);
        assert_eq!(tracker.interval, 1);
        assert_eq!(tracker.count(), 3);
    }
}
