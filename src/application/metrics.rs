//! Observability metrics for notification throttling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing throttling behavior.
///
/// Cloning is cheap; all clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    notifications_admitted: AtomicU64,
    notifications_throttled: AtomicU64,
    windows_evicted: AtomicU64,
    sweeps: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                notifications_admitted: AtomicU64::new(0),
                notifications_throttled: AtomicU64::new(0),
                windows_evicted: AtomicU64::new(0),
                sweeps: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_admitted(&self) {
        self.inner
            .notifications_admitted
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_throttled(&self) {
        self.inner
            .notifications_throttled
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record one cleanup sweep and the windows it evicted.
    pub(crate) fn record_sweep(&self, evicted: usize) {
        self.inner.sweeps.fetch_add(1, Ordering::Relaxed);
        self.inner
            .windows_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Get the total number of notifications admitted.
    pub fn notifications_admitted(&self) -> u64 {
        self.inner.notifications_admitted.load(Ordering::Relaxed)
    }

    /// Get the total number of notifications throttled.
    pub fn notifications_throttled(&self) -> u64 {
        self.inner.notifications_throttled.load(Ordering::Relaxed)
    }

    /// Get the total number of expired windows evicted by cleanup.
    pub fn windows_evicted(&self) -> u64 {
        self.inner.windows_evicted.load(Ordering::Relaxed)
    }

    /// Get the number of cleanup sweeps run.
    pub fn sweeps(&self) -> u64 {
        self.inner.sweeps.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            notifications_admitted: self.notifications_admitted(),
            notifications_throttled: self.notifications_throttled(),
            windows_evicted: self.windows_evicted(),
            sweeps: self.sweeps(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.notifications_admitted.store(0, Ordering::Relaxed);
        self.inner.notifications_throttled.store(0, Ordering::Relaxed);
        self.inner.windows_evicted.store(0, Ordering::Relaxed);
        self.inner.sweeps.store(0, Ordering::Relaxed);
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
    /// Total number of notifications admitted
    pub notifications_admitted: u64,
    /// Total number of notifications throttled
    pub notifications_throttled: u64,
    /// Total number of expired windows evicted
    pub windows_evicted: u64,
    /// Number of cleanup sweeps run
    pub sweeps: u64,
}

impl MetricsSnapshot {
    /// Fraction of checks that were throttled (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing has been checked.
    pub fn throttle_rate(&self) -> f64 {
        let total = self.total_checks();
        if total == 0 {
            0.0
        } else {
            self.notifications_throttled as f64 / total as f64
        }
    }

    /// Total number of checks (admitted + throttled).
    pub fn total_checks(&self) -> u64 {
        self.notifications_admitted
            .saturating_add(self.notifications_throttled)
    }
}
