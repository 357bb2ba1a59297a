//! LogSink - prints the ranking through tracing

use contracts::{ContractError, ReportSink, TalkerReport};
use tracing::{info, instrument};

/// Sink that logs each report as a ranked list
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_report(&self, report: &TalkerReport) {
        let metrics = report.metrics();
        info!(
            sink = %self.name,
            sequence = report.sequence,
            flow_count = metrics.flow_count,
            unique_srcs = metrics.unique_srcs,
            unique_pairs = metrics.unique_pairs,
            window_reset = report.window_reset,
            "Top talkers"
        );

        for (rank, (source, bytes)) in report.talkers.top_sources.iter().enumerate() {
            info!(sink = %self.name, rank = rank + 1, source = %source, bytes, "Top source");
        }

        for (rank, ((source, destination), bytes)) in
            report.talkers.top_pairs.iter().enumerate()
        {
            info!(
                sink = %self.name,
                rank = rank + 1,
                pair = %format_args!("{source}->{destination}"),
                bytes,
                "Top pair"
            );
        }
    }
}

impl ReportSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, report),
        fields(sink = %self.name, sequence = report.sequence)
    )]
    async fn write(&mut self, report: &TalkerReport) -> Result<(), ContractError> {
        self.log_report(report);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
