//! Reporter - periodic top-talker reports fanned out to sinks

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use aggregator::CounterStore;
use contracts::{ReportingConfig, SinkConfig, SinkType, TalkerReport};
use observability::ReportTotals;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::error::ReporterError;
use crate::handle::SinkHandle;
use crate::metrics::{SinkMetrics, SinkStats};
use crate::sinks::{FileSink, LogSink};

/// Build a SinkHandle from configuration
#[instrument(
    name = "reporter_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(config: &SinkConfig) -> Result<SinkHandle, ReporterError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| ReporterError::sink_creation(&config.name, e))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Takes reports from a shared [`CounterStore`] and hands them to sinks
pub struct Reporter {
    store: Arc<CounterStore>,
    config: ReportingConfig,
    handles: Vec<SinkHandle>,
    sequence: u64,
    totals: ReportTotals,
}

impl Reporter {
    /// Create a reporter with prebuilt sink handles
    pub fn with_handles(
        store: Arc<CounterStore>,
        config: ReportingConfig,
        handles: Vec<SinkHandle>,
    ) -> Self {
        Self {
            store,
            config,
            handles,
            sequence: 0,
            totals: ReportTotals::new(),
        }
    }

    /// Delivery counters for every sink
    pub fn sink_metrics(&self) -> Vec<(String, SinkStats)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Live counters for every sink, still readable after `run` consumes self
    pub fn shared_sink_metrics(&self) -> Vec<(String, Arc<SinkMetrics>)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), Arc::clone(h.metrics())))
            .collect()
    }

    /// Take one report now and queue it on every sink
    ///
    /// Selection and the optional window reset happen under one store lock,
    /// so no flow is lost between them.
    #[instrument(name = "reporter_report_now", skip(self), fields(sequence = self.sequence + 1))]
    pub fn report_now(&mut self) -> Arc<TalkerReport> {
        self.sequence += 1;
        let reset = self.config.reset_after_report;
        let talkers = self.store.take_report(self.config.top_k, reset);
        let report = Arc::new(TalkerReport::new(self.sequence, talkers, reset));

        observability::record_report(&report);
        self.totals.update(&report);

        let delivered = self
            .handles
            .iter()
            .filter(|h| h.try_send(Arc::clone(&report)))
            .count();

        debug!(
            sequence = report.sequence,
            flow_count = report.metrics().flow_count,
            sinks = delivered,
            "Report dispatched"
        );

        report
    }

    /// Report every `interval_secs` until `shutdown` flips to `true`
    ///
    /// A final report is taken on the way out, then every sink is drained.
    #[instrument(name = "reporter_run", skip_all, fields(interval_secs = self.config.interval_secs, top_k = self.config.top_k))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ReportTotals {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(sinks = self.handles.len(), "Reporter started");

        while !*shutdown.borrow() {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report_now();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Reporter stopping, taking final report");
        self.report_now();
        self.shutdown().await
    }

    /// Spawn the report loop as a background task
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<ReportTotals> {
        tokio::spawn(self.run(shutdown))
    }

    /// Drain and close every sink
    pub async fn shutdown(self) -> ReportTotals {
        for handle in self.handles {
            handle.shutdown().await;
        }
        info!(reports = self.totals.reports, "Reporter shutdown complete");
        self.totals
    }
}

/// Build a reporter and its sinks from configuration
#[instrument(name = "reporter_create", skip_all, fields(sink_count = sink_configs.len()))]
pub fn create_reporter(
    store: Arc<CounterStore>,
    reporting: ReportingConfig,
    sink_configs: &[SinkConfig],
) -> Result<Reporter, ReporterError> {
    let mut names = HashSet::new();
    for config in sink_configs {
        if !names.insert(config.name.as_str()) {
            return Err(ReporterError::DuplicateSink(config.name.clone()));
        }
    }

    let handles = sink_configs
        .iter()
        .map(create_sink_handle)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Reporter::with_handles(store, reporting, handles))
}
