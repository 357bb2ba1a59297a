//! Counter Store - live aggregate counters behind one lock.
//!
//! All three tables and the flow counter share a single mutex. An update
//! takes it once and applies every increment before releasing it, and every
//! read takes it for the whole scan, so no reader can see a flow applied to
//! one table but not another. Nothing inside the critical section logs,
//! emits metrics or calls out.

use std::collections::HashMap;

use contracts::{FlowRecord, HostPair, MetricsSnapshot, TopTalkers};
use parking_lot::Mutex;
use tracing::debug;

use crate::topk::top_k;

#[derive(Debug, Default)]
struct AggregateState {
    bytes_by_source: HashMap<String, u64>,
    packets_by_source: HashMap<String, u64>,
    bytes_by_pair: HashMap<HostPair, u64>,
    flow_count: u64,
}

impl AggregateState {
    fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            flow_count: self.flow_count,
            unique_srcs: self.bytes_by_source.len(),
            unique_pairs: self.bytes_by_pair.len(),
        }
    }

    fn top_talkers(&self, k: usize) -> TopTalkers {
        TopTalkers {
            top_sources: top_k(&self.bytes_by_source, k),
            top_pairs: top_k(&self.bytes_by_pair, k),
            metrics: self.metrics(),
        }
    }

    fn clear(&mut self) {
        self.bytes_by_source.clear();
        self.packets_by_source.clear();
        self.bytes_by_pair.clear();
        self.flow_count = 0;
    }
}

/// Owned copy of every table, taken under one lock acquisition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSnapshot {
    pub bytes_by_source: HashMap<String, u64>,
    pub packets_by_source: HashMap<String, u64>,
    pub bytes_by_pair: HashMap<HostPair, u64>,
    pub flow_count: u64,
}

/// Concurrent flow counter store
///
/// Share it between writers and readers with `Arc<CounterStore>`; every
/// method takes `&self`.
///
/// Counters saturate at `u64::MAX` rather than wrapping. Memory grows with
/// the number of distinct sources and pairs until the next [`reset`], so
/// long-running callers should reset once per measurement window.
///
/// [`reset`]: CounterStore::reset
#[derive(Debug, Default)]
pub struct CounterStore {
    state: Mutex<AggregateState>,
}

impl CounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one flow into the counters.
    ///
    /// Per-source counters need a source, the pair counter needs both
    /// addresses; the flow count always increments.
    pub fn update(&self, record: &FlowRecord) {
        // Keys are built before locking to keep allocation out of the
        // critical section.
        let source = record.source().map(str::to_owned);
        let pair = match (record.source(), record.destination()) {
            (Some(src), Some(dst)) => Some((src.to_owned(), dst.to_owned())),
            _ => None,
        };
        let (bytes, packets) = (record.bytes, record.packets);

        let mut state = self.state.lock();
        if let Some(source) = source {
            let total = state.bytes_by_source.entry(source.clone()).or_insert(0);
            *total = total.saturating_add(bytes);
            let total = state.packets_by_source.entry(source).or_insert(0);
            *total = total.saturating_add(packets);
        }
        if let Some(pair) = pair {
            let total = state.bytes_by_pair.entry(pair).or_insert(0);
            *total = total.saturating_add(bytes);
        }
        state.flow_count = state.flow_count.saturating_add(1);
    }

    /// Top `k` sources by cumulative bytes, descending
    pub fn top_k_src(&self, k: usize) -> Vec<(String, u64)> {
        let state = self.state.lock();
        top_k(&state.bytes_by_source, k)
    }

    /// Top `k` host pairs by cumulative bytes, descending
    pub fn top_k_pairs(&self, k: usize) -> Vec<(HostPair, u64)> {
        let state = self.state.lock();
        top_k(&state.bytes_by_pair, k)
    }

    /// Flow count and table sizes
    pub fn snapshot_metrics(&self) -> MetricsSnapshot {
        self.state.lock().metrics()
    }

    /// Clear every table and the flow counter in one step
    pub fn reset(&self) {
        let cleared = {
            let mut state = self.state.lock();
            let cleared = state.metrics();
            state.clear();
            cleared
        };
        debug!(
            flow_count = cleared.flow_count,
            unique_srcs = cleared.unique_srcs,
            unique_pairs = cleared.unique_pairs,
            "Counter store reset"
        );
    }

    /// Rank sources and pairs and capture metrics from one state, clearing
    /// it afterwards when `reset` is set.
    ///
    /// Flows that arrive concurrently land either in the returned report or
    /// in the next window, never in neither.
    pub fn take_report(&self, k: usize, reset: bool) -> TopTalkers {
        let mut state = self.state.lock();
        let talkers = state.top_talkers(k);
        if reset {
            state.clear();
        }
        talkers
    }

    /// Cumulative bytes sent by `source`
    pub fn bytes_by_source(&self, source: &str) -> u64 {
        self.state
            .lock()
            .bytes_by_source
            .get(source)
            .copied()
            .unwrap_or(0)
    }

    /// Cumulative packets sent by `source`
    pub fn packets_by_source(&self, source: &str) -> u64 {
        self.state
            .lock()
            .packets_by_source
            .get(source)
            .copied()
            .unwrap_or(0)
    }

    /// Cumulative bytes from `source` to `destination`
    pub fn bytes_by_pair(&self, source: &str, destination: &str) -> u64 {
        let key = (source.to_owned(), destination.to_owned());
        self.state
            .lock()
            .bytes_by_pair
            .get(&key)
            .copied()
            .unwrap_or(0)
    }

    /// Copy out all tables at once
    pub fn snapshot_tables(&self) -> TableSnapshot {
        let state = self.state.lock();
        TableSnapshot {
            bytes_by_source: state.bytes_by_source.clone(),
            packets_by_source: state.packets_by_source.clone(),
            bytes_by_pair: state.bytes_by_pair.clone(),
            flow_count: state.flow_count,
        }
    }
}
