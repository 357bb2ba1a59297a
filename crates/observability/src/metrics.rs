//! FlowSight metric helpers
//!
//! Thin wrappers over the `metrics` facade so every crate emits the same
//! names and labels, plus an in-memory accumulator of report totals for the
//! end-of-run summary.

use contracts::{MetricsSnapshot, TalkerReport};
use metrics::{counter, gauge, histogram};

/// Record one received datagram
pub fn record_datagram_received(len: usize) {
    counter!("flowsight_datagrams_received_total").increment(1);
    histogram!("flowsight_datagram_bytes").record(len as f64);
}

/// Record records decoded from a datagram
pub fn record_flows_decoded(count: u64) {
    if count > 0 {
        counter!("flowsight_flows_decoded_total").increment(count);
    }
}

/// Record lines that failed to decode
pub fn record_decode_errors(count: u64) {
    if count > 0 {
        counter!("flowsight_decode_errors_total").increment(count);
    }
}

/// Record a report taken from the counter store
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_report;
///
/// let report = TalkerReport::new(seq, store.take_report(10, false), false);
/// record_report(&report);
/// ```
pub fn record_report(report: &TalkerReport) {
    counter!("flowsight_reports_total").increment(1);

    let metrics = report.metrics();
    gauge!("flowsight_window_flows").set(metrics.flow_count as f64);
    gauge!("flowsight_window_unique_sources").set(metrics.unique_srcs as f64);
    gauge!("flowsight_window_unique_pairs").set(metrics.unique_pairs as f64);

    if let Some((_, bytes)) = report.talkers.top_sources.first() {
        gauge!("flowsight_top_source_bytes").set(*bytes as f64);
    }

    if report.window_reset {
        counter!("flowsight_windows_rolled_total").increment(1);
    }
}

/// Record a report handed to a sink
pub fn record_report_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "flowsight_reports_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a report dropped because a sink queue was full
pub fn record_report_dropped(sink_name: &str) {
    counter!(
        "flowsight_reports_dropped_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Totals accumulated over every report of a run
#[derive(Debug, Clone, Default)]
pub struct ReportTotals {
    /// Reports taken
    pub reports: u64,

    /// Reports after which the window was cleared
    pub windows_rolled: u64,

    /// Flows counted in windows that were already cleared
    pub flows_in_closed_windows: u64,

    /// Largest distinct source count seen in any report
    pub peak_unique_srcs: usize,

    /// Largest distinct pair count seen in any report
    pub peak_unique_pairs: usize,

    /// Metrics of the most recent report
    pub last: Option<MetricsSnapshot>,

    last_reset: bool,
}

impl ReportTotals {
    /// Create empty totals
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one report in
    pub fn update(&mut self, report: &TalkerReport) {
        let metrics = *report.metrics();
        self.reports += 1;
        self.peak_unique_srcs = self.peak_unique_srcs.max(metrics.unique_srcs);
        self.peak_unique_pairs = self.peak_unique_pairs.max(metrics.unique_pairs);

        if report.window_reset {
            self.windows_rolled += 1;
            self.flows_in_closed_windows += metrics.flow_count;
        }
        self.last = Some(metrics);
        self.last_reset = report.window_reset;
    }

    /// Flows observed over the whole run
    ///
    /// Cumulative reports overlap, so only the latest one counts unless its
    /// window was cleared.
    pub fn total_flows(&self) -> u64 {
        let open_window = match (self.last, self.last_reset) {
            (Some(last), false) => last.flow_count,
            _ => 0,
        };
        self.flows_in_closed_windows + open_window
    }
}

impl std::fmt::Display for ReportTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Report Totals ===")?;
        writeln!(f, "Reports: {}", self.reports)?;
        writeln!(f, "Windows rolled: {}", self.windows_rolled)?;
        writeln!(f, "Flows observed: {}", self.total_flows())?;
        writeln!(f, "Peak unique sources: {}", self.peak_unique_srcs)?;
        writeln!(f, "Peak unique pairs: {}", self.peak_unique_pairs)?;
        Ok(())
    }
}
