//! Resolution counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the resolver and every resource it creates
#[derive(Debug, Default)]
pub struct Metrics {
    memory_hits: AtomicU64,
    persistent_hits: AtomicU64,
    computes: AtomicU64,
    fetches: AtomicU64,
    fetch_failures: AtomicU64,
    classifications: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "memory_hits", "Metric incremented");
    }

    /// `count` fields served from the persistent cache
    pub fn persistent_hits(&self, count: u64) {
        self.persistent_hits.fetch_add(count, Ordering::Relaxed);
        tracing::trace!(counter = "persistent_hits", count, "Metric incremented");
    }

    pub fn computed(&self) {
        self.computes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "computes", "Metric incremented");
    }

    pub fn fetched(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "fetches", "Metric incremented");
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "fetch_failures", "Metric incremented");
    }

    pub fn classified(&self) {
        self.classifications.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "classifications", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            computes: self.computes.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            classifications: self.classifications.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub memory_hits: u64,
    pub persistent_hits: u64,
    pub computes: u64,
    pub fetches: u64,
    pub fetch_failures: u64,
    pub classifications: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.memory_hit();
        metrics.persistent_hits(3);
        metrics.computed();
        metrics.computed();
        metrics.fetched();
        metrics.fetch_failed();
        metrics.classified();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                memory_hits: 1,
                persistent_hits: 3,
                computes: 2,
                fetches: 1,
                fetch_failures: 1,
                classifications: 1,
            }
        );
    }
}
