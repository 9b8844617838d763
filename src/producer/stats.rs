//! Pipeline counters shared by the producer handle and its report loop.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for accepted sends and their outcomes.
///
/// # Memory Ordering
///
/// `Relaxed` is enough: the counters feed `/health` and tests, and nothing
/// makes control-flow decisions on them. Tests read them after
/// `shutdown()` has joined the report loop, which already synchronizes.
#[derive(Debug, Default)]
pub struct DeliveryStats {
    enqueued: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl DeliveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`DeliveryStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub enqueued: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl StatsSnapshot {
    /// Accepted sends still waiting for a delivery report.
    ///
    /// Saturates at zero: a report can be counted before its enqueue.
    pub fn in_flight(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.delivered)
            .saturating_sub(self.failed)
    }

    /// Delivery reports received so far, successful or not.
    pub fn reported(&self) -> u64 {
        self.delivered + self.failed
    }
}
