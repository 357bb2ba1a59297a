//! TalkerReport - Reporter output
//!
//! Point-in-time view of the aggregate counters handed to sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directed host pair: (source, destination)
pub type HostPair = (String, String);

/// Counter Store size metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Number of `update` calls since the last reset
    pub flow_count: u64,

    /// Distinct sources seen
    pub unique_srcs: usize,

    /// Distinct (source, destination) pairs seen
    pub unique_pairs: usize,
}

/// Ranked top talkers taken from one consistent store state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTalkers {
    /// Sources by cumulative bytes, descending
    pub top_sources: Vec<(String, u64)>,

    /// Host pairs by cumulative bytes, descending
    pub top_pairs: Vec<(HostPair, u64)>,

    /// Store size at selection time
    pub metrics: MetricsSnapshot,
}

/// Report emitted once per reporting tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkerReport {
    /// Monotonic report number, starting at 1
    pub sequence: u64,

    /// Time the report was taken
    pub generated_at: DateTime<Utc>,

    /// Whether the counters were cleared right after this report
    pub window_reset: bool,

    /// Ranked talkers
    pub talkers: TopTalkers,
}

impl TalkerReport {
    /// Create a report stamped with the current time
    pub fn new(sequence: u64, talkers: TopTalkers, window_reset: bool) -> Self {
        Self {
            sequence,
            generated_at: Utc::now(),
            window_reset,
            talkers,
        }
    }

    /// Shortcut for `talkers.metrics`
    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.talkers.metrics
    }
}
