//! Insertion timing counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct InsertMetrics {
    flatfile_us: AtomicU64,
    flatfile_blocks: AtomicU64,
    index_us: AtomicU64,
    index_blocks: AtomicU64,
    spend_us: AtomicU64,
    spend_blocks: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InsertMetricsSnapshot {
    pub flatfile_us: u64,
    pub flatfile_blocks: u64,
    pub index_us: u64,
    pub index_blocks: u64,
    pub spend_us: u64,
    pub spend_blocks: u64,
}

impl InsertMetrics {
    pub fn record_flatfile(&self, elapsed: Duration) {
        self.flatfile_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.flatfile_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_index(&self, elapsed: Duration) {
        self.index_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.index_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spend(&self, elapsed: Duration) {
        self.spend_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.spend_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> InsertMetricsSnapshot {
        InsertMetricsSnapshot {
            flatfile_us: self.flatfile_us.load(Ordering::Relaxed),
            flatfile_blocks: self.flatfile_blocks.load(Ordering::Relaxed),
            index_us: self.index_us.load(Ordering::Relaxed),
            index_blocks: self.index_blocks.load(Ordering::Relaxed),
            spend_us: self.spend_us.load(Ordering::Relaxed),
            spend_blocks: self.spend_blocks.load(Ordering::Relaxed),
        }
    }
}
