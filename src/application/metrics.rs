//! Call metrics for a mocked capability.
//!
//! Counts how calls were answered, for diagnostics and for tests that want to
//! check a mock was exercised the way they assumed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking how invocations were resolved.
///
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Total number of invocations recorded
    calls_recorded: AtomicU64,
    /// Invocations answered by a configured stub
    calls_stubbed: AtomicU64,
    /// Invocations answered with the return type's default
    calls_defaulted: AtomicU64,
    /// Invocations that failed
    calls_failed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                calls_recorded: AtomicU64::new(0),
                calls_stubbed: AtomicU64::new(0),
                calls_defaulted: AtomicU64::new(0),
                calls_failed: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_stubbed(&self) {
        self.inner.calls_recorded.fetch_add(1, Ordering::Relaxed);
        self.inner.calls_stubbed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_defaulted(&self) {
        self.inner.calls_recorded.fetch_add(1, Ordering::Relaxed);
        self.inner.calls_defaulted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.inner.calls_recorded.fetch_add(1, Ordering::Relaxed);
        self.inner.calls_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Total calls recorded.
    pub fn calls_recorded(&self) -> u64 {
        self.inner.calls_recorded.load(Ordering::Relaxed)
    }

    /// Calls answered by a stub entry.
    pub fn calls_stubbed(&self) -> u64 {
        self.inner.calls_stubbed.load(Ordering::Relaxed)
    }

    /// Calls no stub matched that returned the default value.
    pub fn calls_defaulted(&self) -> u64 {
        self.inner.calls_defaulted.load(Ordering::Relaxed)
    }

    /// Calls that failed.
    pub fn calls_failed(&self) -> u64 {
        self.inner.calls_failed.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            calls_recorded: self.calls_recorded(),
            calls_stubbed: self.calls_stubbed(),
            calls_defaulted: self.calls_defaulted(),
            calls_failed: self.calls_failed(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.calls_recorded.store(0, Ordering::Relaxed);
        self.inner.calls_stubbed.store(0, Ordering::Relaxed);
        self.inner.calls_defaulted.store(0, Ordering::Relaxed);
        self.inner.calls_failed.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub calls_recorded: u64,
    pub calls_stubbed: u64,
    pub calls_defaulted: u64,
    pub calls_failed: u64,
}

impl MetricsSnapshot {
    /// Share of recorded calls answered with a default value (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing was recorded.
    pub fn default_rate(&self) -> f64 {
        if self.calls_recorded == 0 {
            0.0
        } else {
            self.calls_defaulted as f64 / self.calls_recorded as f64
        }
    }
}
