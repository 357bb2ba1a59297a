//! # Aggregator
//!
//! Top talker aggregation engine.
//!
//! Responsibilities:
//! - Accumulate bytes per source, packets per source and bytes per host pair
//! - Count flows per measurement window
//! - Rank the heaviest sources and pairs with bounded top-K selection
//! - Atomic snapshot and reset for window rolling
//!
//! ## Usage Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use aggregator::CounterStore;
//! use contracts::FlowRecord;
//!
//! let store = Arc::new(CounterStore::new());
//! store.update(&FlowRecord::new("10.0.0.1", "10.0.0.2", 1500, 3));
//! store.update(&FlowRecord::new("10.0.0.1", "10.0.0.3", 500, 1));
//!
//! assert_eq!(store.top_k_src(1), vec![("10.0.0.1".to_string(), 2000)]);
//! assert_eq!(store.snapshot_metrics().unique_pairs, 2);
//!
//! store.reset();
//! assert_eq!(store.snapshot_metrics().flow_count, 0);
//! ```

mod store;
mod topk;

pub use contracts::{FlowRecord, HostPair, MetricsSnapshot, TopTalkers};
pub use store::{CounterStore, TableSnapshot};
pub use topk::top_k;
