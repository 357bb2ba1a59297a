//! Collector counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Collector metrics
///
/// Shared between the receive loop and whoever reports on it.
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    /// Datagrams received
    pub datagrams_received: AtomicU64,

    /// Records decoded and delivered
    pub records_decoded: AtomicU64,

    /// Lines that failed to decode
    pub decode_errors: AtomicU64,
}

impl CollectorMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one datagram and the outcome of decoding it
    pub fn record_datagram(&self, records: u64, errors: u64) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
        self.records_decoded.fetch_add(records, Ordering::Relaxed);
        self.decode_errors.fetch_add(errors, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> CollectorStats {
        CollectorStats {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Collector metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// Datagrams received
    pub datagrams_received: u64,

    /// Records decoded and delivered
    pub records_decoded: u64,

    /// Lines that failed to decode
    pub decode_errors: u64,
}
