// Counters for resolution batches

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters kept across every batch run by an engine
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    pub evaluated_total: AtomicCounter,
    pub resolved_total: AtomicCounter,
    pub already_resolved_total: AtomicCounter,
    pub unknown_metric_total: AtomicCounter,
    pub not_found_total: AtomicCounter,
    pub games_skipped_total: AtomicCounter,
    pub provider_failures_total: AtomicCounter,
    pub sink_failures_total: AtomicCounter,
}

/// Point-in-time copy of [`ResolutionMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub evaluated: u64,
    pub resolved: u64,
    pub already_resolved: u64,
    pub unknown_metric: u64,
    pub not_found: u64,
    pub games_skipped: u64,
    pub provider_failures: u64,
    pub sink_failures: u64,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluated: self.evaluated_total.get(),
            resolved: self.resolved_total.get(),
            already_resolved: self.already_resolved_total.get(),
            unknown_metric: self.unknown_metric_total.get(),
            not_found: self.not_found_total.get(),
            games_skipped: self.games_skipped_total.get(),
            provider_failures: self.provider_failures_total.get(),
            sink_failures: self.sink_failures_total.get(),
        }
    }
}

/// Thread-safe atomic counter
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self { value: AtomicU64::new(0) }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}
