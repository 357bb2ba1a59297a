//! FlowsightConfig - Config Loader output
//!
//! Describes the complete runtime configuration: collector listener,
//! reporting cadence and output routing. Every section has defaults, so an
//! empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowsightConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// UDP collector settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Top talker reporting settings
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Output routing
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

impl Default for FlowsightConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            collector: CollectorConfig::default(),
            reporting: ReportingConfig::default(),
            sinks: default_sinks(),
        }
    }
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig {
        name: "console".to_string(),
        sink_type: SinkType::Log,
        queue_capacity: default_queue_capacity(),
        params: HashMap::new(),
    }]
}

/// UDP collector settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Receive buffer size in bytes; longer datagrams are truncated
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl CollectorConfig {
    /// `host:port` string used for binding
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_buffer_size() -> usize {
    65535
}

/// Reporting cadence and window policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Seconds between reports, must be > 0
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Entries per ranked list, must be > 0
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Clear the counters after each report (rolling windows)
    #[serde(default)]
    pub reset_after_report: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            top_k: default_top_k(),
            reset_after_report: false,
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_top_k() -> usize {
    10
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity (reports)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    16
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Tracing output
    Log,
    /// JSON-lines file output
    File,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_collector_demo() {
        let config = FlowsightConfig::default();
        assert_eq!(config.collector.listen_addr(), "0.0.0.0:9999");
        assert_eq!(config.collector.buffer_size, 65535);
        assert_eq!(config.reporting.top_k, 10);
        assert!(!config.reporting.reset_after_report);
        assert_eq!(config.sinks.len(), 1);
        assert_eq!(config.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: FlowsightConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.version, ConfigVersion::V1);
        assert_eq!(config.collector.port, 9999);
        assert_eq!(config.reporting.interval_secs, 10);
        assert_eq!(config.sinks[0].name, "console");
    }

    #[test]
    fn sink_params_deserialize() {
        let config: FlowsightConfig = serde_json::from_str(
            r#"{"sinks":[{"name":"out","sink_type":"file","params":{"path":"x.jsonl"}}]}"#,
        )
        .unwrap();
        assert_eq!(config.sinks[0].sink_type, SinkType::File);
        assert_eq!(config.sinks[0].queue_capacity, 16);
        assert_eq!(
            config.sinks[0].params.get("path").map(String::as_str),
            Some("x.jsonl")
        );
    }
}
