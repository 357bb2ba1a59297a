//! # Ingestion
//!
//! UDP flow collector.
//!
//! Responsibilities:
//! - Bind a UDP socket and receive datagrams
//! - Split datagrams into newline-delimited JSON records
//! - Decode records leniently into `FlowRecord`
//! - Hand each record to a `FlowCallback`
//!
//! Undecodable lines are counted and logged at debug level; they never
//! stop the receive loop.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::UdpCollector;
//! use aggregator::CounterStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(CounterStore::new());
//! let collector = UdpCollector::bind(&config.collector).await?;
//!
//! let sink = Arc::clone(&store);
//! let handle = collector.spawn(Arc::new(move |flow| sink.update(&flow)), shutdown_rx);
//! ```

mod collector;
mod decode;
mod error;
mod metrics;

// Re-exports
pub use collector::UdpCollector;
pub use contracts::{FlowCallback, FlowRecord};
pub use decode::{decode_datagram, decode_line, DecodedBatch};
pub use error::{IngestionError, Result};
pub use metrics::{CollectorMetrics, CollectorStats};
