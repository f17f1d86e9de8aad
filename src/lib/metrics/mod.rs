//! Metrics types and TSV output.
//!
//! - [`GroupingStats`] - counts from multi-hit grouping
//! - [`MatePairingMetrics`] - counts from mate pairing
//! - [`MatedPairRow`] - one matched template
//! - [`writer`] - TSV writing

pub mod writer;

use serde::Serialize;

pub use crate::hits::GroupingStats;
pub use crate::mates::{MatePairingMetrics, MatedPairRow};
pub use writer::{write_metrics, write_metrics_auto};

/// A serializable metric row with a human-readable name for messages.
pub trait Metric: Serialize {
    /// Name used in log and error messages.
    fn metric_name() -> &'static str;
}

impl Metric for GroupingStats {
    fn metric_name() -> &'static str {
        "multi-hit grouping"
    }
}

impl Metric for MatePairingMetrics {
    fn metric_name() -> &'static str {
        "mate pairing"
    }
}

impl Metric for MatedPairRow {
    fn metric_name() -> &'static str {
        "mated pair"
    }
}
