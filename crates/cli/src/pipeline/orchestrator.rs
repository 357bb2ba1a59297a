//! Pipeline orchestrator - wires the collector, counter store and reporter.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aggregator::CounterStore;
use anyhow::{Context, Result};
use contracts::{FlowCallback, FlowsightConfig};
use ingestion::UdpCollector;
use tokio::sync::watch;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated configuration (CLI overrides already applied)
    pub config: FlowsightConfig,

    /// Pipeline timeout (None = run until shutdown)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the timeout elapses or the collector fails
    ///
    /// The reporter always takes a final report before this returns.
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let config = &self.config.config;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let store = Arc::new(CounterStore::new());

        let collector = UdpCollector::bind(&config.collector)
            .await
            .with_context(|| {
                format!(
                    "Failed to bind collector on {}",
                    config.collector.listen_addr()
                )
            })?;
        let listen_addr = collector
            .local_addr()
            .context("Failed to read collector address")?;

        if config.sinks.is_empty() {
            warn!("No sinks configured - reports will only update metrics");
        }

        let reporter = reporter::create_reporter(
            Arc::clone(&store),
            config.reporting.clone(),
            &config.sinks,
        )
        .context("Failed to create reporter")?;
        let sink_metrics = reporter.shared_sink_metrics();

        let (stop_tx, stop_rx) = watch::channel(false);

        let update_store = Arc::clone(&store);
        let on_flow: FlowCallback = Arc::new(move |flow| update_store.update(&flow));

        let mut collector_handle = collector.spawn(on_flow, stop_rx.clone());
        let reporter_handle = reporter.spawn(stop_rx);

        info!(
            addr = %listen_addr,
            interval_secs = config.reporting.interval_secs,
            top_k = config.reporting.top_k,
            reset_after_report = config.reporting.reset_after_report,
            sinks = sink_metrics.len(),
            "Pipeline running"
        );

        let timeout = self.config.timeout;
        let deadline = async move {
            match timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };

        let collector_exit = tokio::select! {
            _ = shutdown => {
                warn!("Received shutdown signal, stopping pipeline...");
                None
            }
            _ = deadline => {
                info!(timeout_secs = timeout.map(|t| t.as_secs()), "Pipeline timeout reached");
                None
            }
            result = &mut collector_handle => Some(result),
        };

        info!("Shutting down pipeline...");
        // Both tasks may already be gone, nobody left to tell
        let _ = stop_tx.send(true);

        let collector_result = match collector_exit {
            Some(result) => result,
            None => collector_handle.await,
        };
        let reports = reporter_handle.await.context("Reporter task panicked")?;
        let collector = collector_result
            .context("Collector task panicked")?
            .context("Collector stopped with an error")?;

        let stats = PipelineStats {
            listen_addr: Some(listen_addr),
            duration: start_time.elapsed(),
            collector,
            store: store.snapshot_metrics(),
            reports,
            sinks: sink_metrics
                .iter()
                .map(|(name, metrics)| (name.clone(), metrics.snapshot()))
                .collect(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            flows = stats.collector.records_decoded,
            reports = stats.reports.reports,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
