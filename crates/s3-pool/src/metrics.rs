//! Pool lifecycle counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Internal atomic counters, bumped by the pool as events occur.
#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    connections_created: AtomicU64,
    connections_closed: AtomicU64,
    checkouts_successful: AtomicU64,
    checkouts_failed: AtomicU64,
}

impl MetricsRecorder {
    pub(crate) fn record_connection_created(&self) {
        self.connections_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_checkout_success(&self) {
        self.checkouts_successful.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_checkout_failure(&self) {
        self.checkouts_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolMetrics {
        PoolMetrics {
            connections_created: self.connections_created.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            checkouts_successful: self.checkouts_successful.load(Ordering::Relaxed),
            checkouts_failed: self.checkouts_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pool activity counters.
#[derive(Debug, Clone, Copy)]
pub struct PoolMetrics {
    /// Connections established over the lifetime of the pool.
    pub connections_created: u64,
    /// Connections closed during teardown.
    pub connections_closed: u64,
    /// Checkouts that produced a connection.
    pub checkouts_successful: u64,
    /// Checkouts that failed (wait budget exhausted or establishment error).
    pub checkouts_failed: u64,
}

impl PoolMetrics {
    /// Fraction of checkouts that succeeded, in `0.0..=1.0`.
    ///
    /// Returns `1.0` when no checkouts have been attempted.
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            return 1.0;
        }
        self.checkouts_successful as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_with_no_checkouts() {
        let recorder = MetricsRecorder::default();
        assert!((recorder.snapshot().checkout_success_rate() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_mixed() {
        let recorder = MetricsRecorder::default();
        recorder.record_checkout_success();
        recorder.record_checkout_success();
        recorder.record_checkout_success();
        recorder.record_checkout_failure();

        let metrics = recorder.snapshot();
        assert_eq!(metrics.checkouts_successful, 3);
        assert_eq!(metrics.checkouts_failed, 1);
        assert!((metrics.checkout_success_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_captures_counts() {
        let recorder = MetricsRecorder::default();
        recorder.record_connection_created();
        recorder.record_connection_created();
        recorder.record_connection_closed();

        let metrics = recorder.snapshot();
        assert_eq!(metrics.connections_created, 2);
        assert_eq!(metrics.connections_closed, 1);
    }
}
