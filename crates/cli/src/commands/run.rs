//! `run` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::FlowsightConfig;
use std::time::Duration;
use tracing::{error, info};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args)?;
    apply_overrides(&mut config, args);
    ConfigLoader::validate(&config).context("Invalid configuration after CLI overrides")?;

    info!(
        addr = %config.collector.listen_addr(),
        interval_secs = config.reporting.interval_secs,
        top_k = config.reporting.top_k,
        reset_after_report = config.reporting.reset_after_report,
        sinks = config.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        config,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    info!("Starting pipeline...");

    let stats = Pipeline::new(pipeline_config)
        .run(shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        flows = stats.collector.records_decoded,
        reports = stats.reports.reports,
        duration_secs = stats.duration.as_secs_f64(),
        flows_per_sec = format!("{:.2}", stats.flows_per_sec()),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    info!("FlowSight finished");
    Ok(())
}

/// Load the configuration file, or fall back to built-in defaults
fn load_config(args: &RunArgs) -> Result<FlowsightConfig> {
    match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            info!("No configuration file given, using defaults");
            Ok(FlowsightConfig::default())
        }
    }
}

/// Apply CLI overrides on top of the loaded configuration
fn apply_overrides(config: &mut FlowsightConfig, args: &RunArgs) {
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding collector host from CLI");
        config.collector.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port, "Overriding collector port from CLI");
        config.collector.port = port;
    }
    if let Some(interval) = args.interval {
        info!(interval_secs = interval, "Overriding report interval from CLI");
        config.reporting.interval_secs = interval;
    }
    if let Some(top_k) = args.top_k {
        info!(top_k, "Overriding top_k from CLI");
        config.reporting.top_k = top_k;
    }
    if args.reset_after_report {
        config.reporting.reset_after_report = true;
    }
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves, so the other one (or
/// `--timeout`) still stops the pipeline.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &FlowsightConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Collector:");
    println!("  Listen: {}", config.collector.listen_addr());
    println!("  Buffer size: {} bytes", config.collector.buffer_size);

    println!("\nReporting:");
    println!("  Interval: {}s", config.reporting.interval_secs);
    println!("  Top K: {}", config.reporting.top_k);
    println!("  Reset after report: {}", config.reporting.reset_after_report);

    if !config.sinks.is_empty() {
        println!("\nSinks ({}):", config.sinks.len());
        for sink in &config.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
