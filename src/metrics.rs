/// Request counters for /health and /metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    /// Calculations answered with 200
    pub succeeded: u64,
    /// Calculations answered with 400
    pub rejected: u64,
    /// Calculations answered with 500
    pub failed: u64,
}

impl RequestStats {
    pub fn total(&self) -> u64 {
        self.succeeded + self.rejected + self.failed
    }
}

/// Shared counters updated from every connection task
#[derive(Debug, Default)]
pub struct RequestMetrics {
    succeeded: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> RequestStats {
        RequestStats {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
