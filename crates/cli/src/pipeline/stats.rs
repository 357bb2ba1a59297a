//! Pipeline statistics and metrics.

use std::net::SocketAddr;
use std::time::Duration;

use contracts::MetricsSnapshot;
use ingestion::CollectorStats;
use observability::ReportTotals;
use reporter::SinkStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Address the collector was bound to
    pub listen_addr: Option<SocketAddr>,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Datagram and decode counters
    pub collector: CollectorStats,

    /// Counter store size at shutdown (after the final report)
    pub store: MetricsSnapshot,

    /// Totals over every report taken
    pub reports: ReportTotals,

    /// Delivery counters per sink
    pub sinks: Vec<(String, SinkStats)>,
}

impl PipelineStats {
    /// Decoded flows per second
    pub fn flows_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.collector.records_decoded as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of non-blank lines that failed to decode, as a percentage
    pub fn decode_error_rate(&self) -> f64 {
        let total = self.collector.records_decoded + self.collector.decode_errors;
        if total > 0 {
            (self.collector.decode_errors as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    FlowSight Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Collector");
        if let Some(addr) = self.listen_addr {
            println!("   ├─ Address: {}", addr);
        }
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Datagrams: {}", self.collector.datagrams_received);
        println!("   ├─ Flows decoded: {}", self.collector.records_decoded);
        println!(
            "   ├─ Decode errors: {} ({:.2}%)",
            self.collector.decode_errors,
            self.decode_error_rate()
        );
        println!("   └─ Flows/s: {:.2}", self.flows_per_sec());

        println!("\n📈 Reports");
        println!("   ├─ Reports taken: {}", self.reports.reports);
        println!("   ├─ Windows rolled: {}", self.reports.windows_rolled);
        println!("   ├─ Flows observed: {}", self.reports.total_flows());
        println!("   ├─ Peak unique sources: {}", self.reports.peak_unique_srcs);
        println!("   └─ Peak unique pairs: {}", self.reports.peak_unique_pairs);

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, stats)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: {}/{} written, {} failed, {} dropped",
                    prefix,
                    name,
                    stats.written,
                    stats.offered(),
                    stats.failed,
                    stats.dropped
                );
            }
        }

        println!();
    }
}
