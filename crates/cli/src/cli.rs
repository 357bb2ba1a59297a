//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// FlowSight - top talker collector for UDP flow records
#[derive(Parser, Debug)]
#[command(
    name = "flowsight",
    author,
    version,
    about = "Top talker collector for UDP flow records",
    long_about = "Receives newline-delimited JSON flow records over UDP, accumulates \n\
                  bytes per source and per host pair, and periodically reports the \n\
                  heaviest talkers to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FLOWSIGHT_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FLOWSIGHT_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the collector and reporter
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); built-in defaults when omitted
    #[arg(short, long, env = "FLOWSIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override collector listen host
    #[arg(long, env = "FLOWSIGHT_HOST")]
    pub host: Option<String>,

    /// Override collector listen port
    #[arg(long, env = "FLOWSIGHT_PORT")]
    pub port: Option<u16>,

    /// Override report interval in seconds
    #[arg(long, env = "FLOWSIGHT_INTERVAL")]
    pub interval: Option<u64>,

    /// Override number of talkers per report
    #[arg(long, env = "FLOWSIGHT_TOP_K")]
    pub top_k: Option<usize>,

    /// Clear counters after every report
    #[arg(long, env = "FLOWSIGHT_RESET_AFTER_REPORT")]
    pub reset_after_report: bool,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "FLOWSIGHT_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without binding the socket
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "FLOWSIGHT_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "flowsight.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "flowsight.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "flowsight",
            "run",
            "--port",
            "5000",
            "--top-k",
            "3",
            "--interval",
            "2",
            "--reset-after-report",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.port, Some(5000));
                assert_eq!(args.top_k, Some(3));
                assert_eq!(args.interval, Some(2));
                assert!(args.reset_after_report);
                assert!(args.config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["flowsight", "-q", "-v", "validate"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_default_path() {
        let cli = Cli::try_parse_from(["flowsight", "validate", "--json"]).unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.config, PathBuf::from("flowsight.toml"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
