use std::sync::atomic::{AtomicU64, Ordering};

/// Running admission counters owned by one filter instance
///
/// Counters only ever grow. They are atomics so a filter shared between
/// workers can be observed while it is being applied.
#[derive(Debug, Default)]
pub struct FilterStats {
    total_seen: AtomicU64,
    passed: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time copy of a [`FilterStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStatsSnapshot {
    pub total_seen: u64,
    pub passed: u64,
    pub rejected: u64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one decision
    pub fn record(&self, passed: bool) {
        self.total_seen.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> FilterStatsSnapshot {
        FilterStatsSnapshot {
            total_seen: self.total_seen.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
