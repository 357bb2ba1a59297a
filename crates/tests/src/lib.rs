//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - UDP -> Collector -> CounterStore -> Reporter -> FileSink 端到端测试

#[cfg(test)]
mod contract_tests {
    use contracts::{FlowRecord, FlowsightConfig, SinkType};

    #[test]
    fn test_default_config_round_trips_through_loader() {
        let config = FlowsightConfig::default();
        let toml = config_loader::ConfigLoader::to_toml(&config).unwrap();
        let again =
            config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        assert_eq!(again.collector.listen_addr(), "0.0.0.0:9999");
        assert_eq!(again.reporting.top_k, 10);
        assert_eq!(again.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_wire_record_snapshot() {
        let record: FlowRecord = serde_json::from_str(
            r#"{"src_ip":"10.0.0.1","dst_ip":"10.0.0.2","bytes":"1500","packets":2.9}"#,
        )
        .unwrap();
        assert_eq!(record, FlowRecord::new("10.0.0.1", "10.0.0.2", 1500, 2));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use aggregator::CounterStore;
    use contracts::{CollectorConfig, FlowCallback, ReportingConfig, SinkConfig, SinkType};
    use ingestion::UdpCollector;
    use observability::ReportTotals;
    use serde_json::Value;
    use tokio::net::UdpSocket;
    use tokio::sync::watch;
    use tokio::time::{sleep, timeout};

    fn loopback() -> CollectorConfig {
        CollectorConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            buffer_size: 65535,
        }
    }

    fn file_sink(path: &Path) -> SinkConfig {
        SinkConfig {
            name: "snapshots".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 8,
            params: HashMap::from([("path".to_string(), path.display().to_string())]),
        }
    }

    fn read_rows(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Start a collector feeding `store`
    async fn start_collector(
        store: &Arc<CounterStore>,
        shutdown: watch::Receiver<bool>,
    ) -> (
        SocketAddr,
        tokio::task::JoinHandle<ingestion::Result<ingestion::CollectorStats>>,
    ) {
        let collector = UdpCollector::bind(&loopback()).await.unwrap();
        let addr = collector.local_addr().unwrap();
        let sink = Arc::clone(store);
        let on_flow: FlowCallback = Arc::new(move |flow| sink.update(&flow));
        (addr, collector.spawn(on_flow, shutdown))
    }

    async fn wait_for_flows(store: &CounterStore, count: u64) {
        timeout(Duration::from_secs(5), async {
            while store.snapshot_metrics().flow_count < count {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("flows not counted in time");
    }

    /// End-to-end test: UDP datagrams -> collector -> store -> reporter -> file
    ///
    /// 验证完整的数据流：
    /// 1. 一个数据报携带多行 JSON 流记录 (含无效行)
    /// 2. CounterStore 累加字节数
    /// 3. Reporter 最终报告写入 JSON-lines 文件
    #[tokio::test]
    async fn test_e2e_udp_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talkers.jsonl");

        let store = Arc::new(CounterStore::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (addr, collector_handle) = start_collector(&store, shutdown_rx.clone()).await;

        let reporting = ReportingConfig {
            interval_secs: 3600,
            top_k: 2,
            reset_after_report: false,
        };
        let reporter =
            reporter::create_reporter(Arc::clone(&store), reporting, &[file_sink(&path)])
                .unwrap();
        let reporter_handle = reporter.spawn(shutdown_rx);

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let payload = concat!(
            r#"{"src_ip":"A","dst_ip":"B","bytes":100,"packets":1}"#,
            "\n",
            "not json\n",
            r#"{"src_ip":"A","dst_ip":"C","bytes":50,"packets":1}"#,
            "\n",
            r#"{"src_ip":"B","dst_ip":"C","bytes":80,"packets":1}"#,
        );
        client.send_to(payload.as_bytes(), addr).await.unwrap();

        wait_for_flows(&store, 3).await;
        shutdown_tx.send(true).unwrap();

        let collector_stats = collector_handle.await.unwrap().unwrap();
        let totals: ReportTotals = reporter_handle.await.unwrap();

        assert_eq!(collector_stats.records_decoded, 3);
        assert_eq!(collector_stats.decode_errors, 1);
        assert_eq!(totals.reports, 1);
        assert_eq!(totals.total_flows(), 3);
        assert_eq!(totals.peak_unique_srcs, 2);
        assert_eq!(totals.peak_unique_pairs, 3);
        assert!(totals.to_string().contains("Windows rolled: 0"));

        let rows = read_rows(&path);
        let entries: Vec<(String, String, u64)> = rows
            .iter()
            .map(|r| {
                (
                    r["metric"].as_str().unwrap().to_string(),
                    r["key"].as_str().unwrap().to_string(),
                    r["bytes"].as_u64().unwrap(),
                )
            })
            .collect();

        assert_eq!(
            entries,
            vec![
                ("top_src".to_string(), "A".to_string(), 150),
                ("top_src".to_string(), "B".to_string(), 80),
                ("top_pair".to_string(), "A->B".to_string(), 100),
                ("top_pair".to_string(), "B->C".to_string(), 80),
            ]
        );
    }

    /// Rolling windows: each report only covers flows since the previous one
    #[tokio::test]
    async fn test_e2e_rolling_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windows.jsonl");

        let store = Arc::new(CounterStore::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (addr, collector_handle) = start_collector(&store, shutdown_rx).await;

        let reporting = ReportingConfig {
            interval_secs: 3600,
            top_k: 5,
            reset_after_report: true,
        };
        let mut reporter =
            reporter::create_reporter(Arc::clone(&store), reporting, &[file_sink(&path)])
                .unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        client
            .send_to(br#"{"src_ip":"A","dst_ip":"B","bytes":10}"#, addr)
            .await
            .unwrap();
        wait_for_flows(&store, 1).await;
        let first = reporter.report_now();
        assert_eq!(first.talkers.top_sources, vec![("A".to_string(), 10)]);
        assert_eq!(store.snapshot_metrics().flow_count, 0);

        client
            .send_to(br#"{"src_ip":"Z","dst_ip":"B","bytes":7}"#, addr)
            .await
            .unwrap();
        wait_for_flows(&store, 1).await;
        let second = reporter.report_now();
        assert_eq!(second.talkers.top_sources, vec![("Z".to_string(), 7)]);

        shutdown_tx.send(true).unwrap();
        collector_handle.await.unwrap().unwrap();
        let totals = reporter.shutdown().await;

        assert_eq!(totals.windows_rolled, 2);
        assert_eq!(totals.total_flows(), 2);
        assert_eq!(read_rows(&path).len(), 4);
    }

    /// Wait until the flow count stops moving
    async fn wait_for_quiet(store: &CounterStore) -> u64 {
        let mut last = store.snapshot_metrics().flow_count;
        loop {
            sleep(Duration::from_millis(100)).await;
            let now = store.snapshot_metrics().flow_count;
            if now == last {
                return now;
            }
            last = now;
        }
    }

    /// Many concurrent senders: every decoded record reaches the store
    ///
    /// UDP may drop datagrams on a busy loopback, so the check is that the
    /// store agrees with the collector, not that every send arrived.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_concurrent_senders() {
        const SENDERS: usize = 4;
        const DATAGRAMS: usize = 50;

        let store = Arc::new(CounterStore::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (addr, collector_handle) = start_collector(&store, shutdown_rx).await;

        let mut senders = Vec::new();
        for s in 0..SENDERS {
            senders.push(tokio::spawn(async move {
                let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
                for _ in 0..DATAGRAMS {
                    let line = format!(r#"{{"src_ip":"h{s}","dst_ip":"sink","bytes":3,"packets":1}}"#);
                    client.send_to(line.as_bytes(), addr).await.unwrap();
                    sleep(Duration::from_millis(1)).await;
                }
            }));
        }
        for sender in senders {
            sender.await.unwrap();
        }

        wait_for_flows(&store, 1).await;
        let counted = wait_for_quiet(&store).await;
        shutdown_tx.send(true).unwrap();
        let stats = collector_handle.await.unwrap().unwrap();

        let sent = (SENDERS * DATAGRAMS) as u64;
        assert_eq!(stats.records_decoded, counted);
        assert_eq!(stats.decode_errors, 0);
        assert!(counted <= sent);

        let metrics = store.snapshot_metrics();
        assert_eq!(metrics.flow_count, stats.records_decoded);
        assert!(metrics.unique_srcs <= SENDERS);
        assert_eq!(metrics.unique_srcs, metrics.unique_pairs);

        let top = store.top_k_src(SENDERS);
        let total: u64 = top.iter().map(|(_, bytes)| bytes).sum();
        assert_eq!(total, 3 * counted);
        // Descending by bytes, equal totals in ascending source order
        for pair in top.windows(2) {
            let ((a, a_bytes), (b, b_bytes)) = (&pair[0], &pair[1]);
            assert!(a_bytes > b_bytes || (a_bytes == b_bytes && a < b));
        }
        if counted == sent {
            let names: Vec<&str> = top.iter().map(|(s, _)| s.as_str()).collect();
            assert_eq!(names, vec!["h0", "h1", "h2", "h3"]);
        }
    }

    /// Config file -> loader -> reporter wiring
    #[tokio::test]
    async fn test_e2e_reporter_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out").join("talkers.jsonl");
        let config_path = dir.path().join("flowsight.toml");
        std::fs::write(
            &config_path,
            format!(
                "[reporting]\ntop_k = 1\n\n[[sinks]]\nname = \"snapshots\"\nsink_type = \"file\"\nparams = {{ path = \"{}\" }}\n",
                out.display().to_string().replace('\\', "\\\\")
            ),
        )
        .unwrap();

        let config = config_loader::ConfigLoader::load_from_path(&config_path).unwrap();
        let store = Arc::new(CounterStore::new());
        store.update(&contracts::FlowRecord::new("A", "B", 5, 1));
        store.update(&contracts::FlowRecord::new("C", "B", 9, 1));

        let mut reporter =
            reporter::create_reporter(Arc::clone(&store), config.reporting, &config.sinks)
                .unwrap();
        reporter.report_now();
        let sinks = reporter.sink_metrics();
        reporter.shutdown().await;

        assert_eq!(sinks[0].0, "snapshots");
        let rows = read_rows(&out);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["key"], "C");
        assert_eq!(rows[1]["key"], "C->B");
    }
}
