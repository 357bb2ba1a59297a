//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::FlowsightConfig;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    collector: CollectorInfo,
    reporting: ReportingInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct CollectorInfo {
    listen_addr: String,
    buffer_size: usize,
}

#[derive(Serialize)]
struct ReportingInfo {
    interval_secs: u64,
    top_k: usize,
    reset_after_report: bool,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &FlowsightConfig, args: &InfoArgs) -> ConfigInfo {
    let sinks = if args.sinks {
        config
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
                params: s.params.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", config.version),
        collector: CollectorInfo {
            listen_addr: config.collector.listen_addr(),
            buffer_size: config.collector.buffer_size,
        },
        reporting: ReportingInfo {
            interval_secs: config.reporting.interval_secs,
            top_k: config.reporting.top_k,
            reset_after_report: config.reporting.reset_after_report,
        },
        sinks,
    }
}

fn print_config_info(config: &FlowsightConfig, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                FlowSight Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Collector");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Listen: {}", config.collector.listen_addr());
    println!("   └─ Buffer size: {} bytes", config.collector.buffer_size);

    let reporting = &config.reporting;
    println!("\n⚙️  Reporting");
    println!("   ├─ Interval: {}s", reporting.interval_secs);
    println!("   ├─ Top K: {}", reporting.top_k);
    if reporting.reset_after_report {
        println!("   └─ Window: reset after every report");
    } else {
        println!("   └─ Window: cumulative");
    }

    if !config.sinks.is_empty() {
        println!("\n📤 Sinks ({})", config.sinks.len());
        for (i, sink) in config.sinks.iter().enumerate() {
            let is_last = i == config.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            let child_prefix = if is_last { "   " } else { "│  " };
            println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);

            if args.sinks {
                println!("   {}  ├─ Queue capacity: {}", child_prefix, sink.queue_capacity);
                let mut params: Vec<_> = sink.params.iter().collect();
                params.sort();
                if params.is_empty() {
                    println!("   {}  └─ Params: (none)", child_prefix);
                }
                for (j, (key, value)) in params.iter().enumerate() {
                    let param_prefix = if j == params.len() - 1 { "└─" } else { "├─" };
                    println!("   {}  {} {} = {}", child_prefix, param_prefix, key, value);
                }
            }
        }
    }

    println!();
}
