//! FileSink - appends reports to a JSON-lines file
//!
//! Each ranked entry becomes one line:
//!
//! ```text
//! {"ts":"2025-01-01T00:00:00Z","metric":"top_src","key":"10.0.0.1","bytes":1500}
//! {"ts":"2025-01-01T00:00:00Z","metric":"top_pair","key":"10.0.0.1->10.0.0.2","bytes":1500}
//! ```

use chrono::{DateTime, Utc};
use contracts::{ContractError, ReportSink, TalkerReport};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

const METRIC_TOP_SOURCE: &str = "top_src";
const METRIC_TOP_PAIR: &str = "top_pair";

/// One output line
#[derive(Debug, Serialize)]
struct Row<'a> {
    ts: DateTime<Utc>,
    metric: &'static str,
    key: &'a str,
    bytes: u64,
}

/// Sink that appends ranked rows to a file
pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directories
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, ContractError> {
        let name = name.into();
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| ContractError::sink_open(&name, format!("{}: {e}", parent.display())))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ContractError::sink_open(&name, format!("{}: {e}", path.display())))?;

        debug!(sink = %name, path = %path.display(), "FileSink opened");

        Ok(Self {
            name,
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Build from the sink's `params` map; `path` is required
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let path = params
            .get("path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ContractError::sink_open(&name, "missing 'path' parameter"))?;
        Self::new(name, path)
    }

    fn write_row(&mut self, row: &Row<'_>) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, row)?;
        self.writer.write_all(b"\n")
    }

    fn append_report(&mut self, report: &TalkerReport) -> std::io::Result<()> {
        let ts = report.generated_at;

        for (source, bytes) in &report.talkers.top_sources {
            self.write_row(&Row {
                ts,
                metric: METRIC_TOP_SOURCE,
                key: source,
                bytes: *bytes,
            })?;
        }

        for ((source, destination), bytes) in &report.talkers.top_pairs {
            let key = format!("{source}->{destination}");
            self.write_row(&Row {
                ts,
                metric: METRIC_TOP_PAIR,
                key: &key,
                bytes: *bytes,
            })?;
        }

        // Each report lands on disk whole before the next one is taken
        self.writer.flush()
    }
}

impl ReportSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, report),
        fields(sink = %self.name, sequence = report.sequence)
    )]
    async fn write(&mut self, report: &TalkerReport) -> Result<(), ContractError> {
        self.append_report(report).map_err(|e| {
            error!(sink = %self.name, sequence = report.sequence, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(sink = %self.name, path = %self.path.display(), "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{MetricsSnapshot, TopTalkers};
    use serde_json::Value;
    use std::path::Path;
    use tempfile::tempdir;

    fn sample_report(sequence: u64) -> TalkerReport {
        TalkerReport::new(
            sequence,
            TopTalkers {
                top_sources: vec![("A".into(), 150), ("B".into(), 80)],
                top_pairs: vec![(("A".into(), "B".into()), 100)],
                metrics: MetricsSnapshot {
                    flow_count: 3,
                    unique_srcs: 2,
                    unique_pairs: 2,
                },
            },
            false,
        )
    }

    fn read_rows(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_file_sink_writes_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("talkers.jsonl");

        let mut sink = FileSink::new("snapshots", &path).unwrap();
        sink.write(&sample_report(1)).await.unwrap();
        sink.close().await.unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["metric"], "top_src");
        assert_eq!(rows[0]["key"], "A");
        assert_eq!(rows[0]["bytes"], 150);
        assert_eq!(rows[2]["metric"], "top_pair");
        assert_eq!(rows[2]["key"], "A->B");
        assert!(rows[0]["ts"].as_str().unwrap().contains('T'));
    }

    #[tokio::test]
    async fn test_file_sink_appends_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("talkers.jsonl");

        for seq in 1..=2 {
            let mut sink = FileSink::new("snapshots", &path).unwrap();
            sink.write(&sample_report(seq)).await.unwrap();
            sink.close().await.unwrap();
        }

        assert_eq!(read_rows(&path).len(), 6);
    }

    #[test]
    fn test_from_params_requires_path() {
        let err = FileSink::from_params("snapshots", &HashMap::new())
            .err()
            .unwrap();
        assert!(err.to_string().contains("path"));
    }
}
