//! Human-readable formatting for log output and run summaries.

use std::time::{Duration, Instant};

use log::info;

use crate::hits::GroupingStats;
use crate::mates::MatePairingMetrics;

/// Formats a count with comma thousands separators.
///
/// ```
/// use mateflow_lib::logging::format_count;
///
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// assert_eq!(format_count(999), "999");
/// ```
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction as a percentage with `decimals` places.
#[must_use]
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", fraction * 100.0)
}

/// Formats a duration as `45s`, `2m 15s` or `1h 30m`.
///
/// ```
/// use mateflow_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, mins, secs) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (hours, mins, secs) {
        (0, 0, s) => format!("{s}s"),
        (0, m, 0) => format!("{m}m"),
        (0, m, s) => format!("{m}m {s}s"),
        (h, 0, _) => format!("{h}h"),
        (h, m, _) => format!("{h}h {m}m"),
    }
}

/// Formats a processing rate, falling back to items per minute below one per second.
#[must_use]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} items/s", format_count(count));
    }
    let per_sec = count as f64 / secs;
    if per_sec >= 1.0 {
        format!("{} items/s", format_count(per_sec as u64))
    } else {
        format!("{:.1} items/min", per_sec * 60.0)
    }
}

/// Times an operation and logs its start and completion.
///
/// ```
/// use mateflow_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Grouping hits");
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    started: Instant,
}

impl OperationTimer {
    /// Starts the timer and logs the operation name.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        info!("{operation} ...");
        Self { operation: operation.to_string(), started: Instant::now() }
    }

    /// Time since the timer started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs completion with the number of items processed and the rate.
    pub fn log_completion(&self, count: u64) {
        let elapsed = self.elapsed();
        info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(elapsed),
            format_rate(count, elapsed)
        );
    }
}

/// Logs a summary of a multi-hit grouping run.
pub fn log_grouping_summary(stats: &GroupingStats) {
    info!("Multi-hit grouping summary:");
    info!("  Records read: {}", format_count(stats.records_read));
    info!("  Records filtered (unmapped or unaligned): {}", format_count(stats.records_filtered));
    info!("  Records with hard clips restored: {}", format_count(stats.records_clip_repaired));
    info!("  Groups emitted: {}", format_count(stats.groups_emitted));
    if stats.groups_emitted > 0 {
        let ambiguous = stats.groups_ambiguous as f64 / stats.groups_emitted as f64;
        info!(
            "  Groups with multiple hits: {} ({})",
            format_count(stats.groups_ambiguous),
            format_percent(ambiguous, 2)
        );
    }
}

/// Logs a summary of a mate pairing run.
pub fn log_pairing_summary(metrics: &MatePairingMetrics) {
    info!("Mate pairing summary:");
    info!("  Records read: {}", format_count(metrics.records_read));
    info!("  Pairs mated: {}", format_count(metrics.pairs_mated));
    info!("  Cross-reference pairs: {}", format_count(metrics.cross_reference_pairs));
    info!(
        "  Skipped: {} secondary/supplementary, {} unpaired, {} unmapped, {} with unmapped mate",
        format_count(metrics.secondary_or_supplementary),
        format_count(metrics.unpaired),
        format_count(metrics.unmapped),
        format_count(metrics.mate_unmapped)
    );
    info!(
        "  Peak waiting ends: {} ({} in memory)",
        format_count(metrics.max_pending),
        format_count(metrics.max_pending_in_ram)
    );
    if metrics.orphans > 0 {
        log::warn!("  {} ends never met their mate", format_count(metrics.orphans));
    }
}
