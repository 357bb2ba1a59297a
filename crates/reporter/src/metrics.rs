//! Per-sink delivery counters

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Delivery metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Reports waiting in the queue
    queued: AtomicUsize,
    /// Reports the sink accepted
    written: AtomicU64,
    /// Reports the sink rejected
    failed: AtomicU64,
    /// Reports never queued because the queue was full
    dropped: AtomicU64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn set_queued(&self, len: usize) {
        self.queued.store(len, Ordering::Relaxed);
    }

    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn inc_written(&self) {
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters out
    pub fn snapshot(&self) -> SinkStats {
        SinkStats {
            queued: self.queued(),
            written: self.written(),
            failed: self.failed(),
            dropped: self.dropped(),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub queued: usize,
    pub written: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl SinkStats {
    /// Reports offered to the sink, whatever happened to them
    pub fn offered(&self) -> u64 {
        self.written + self.failed + self.dropped + self.queued as u64
    }
}
