use std::sync::Mutex;

/// Running score counters owned by one scorer instance
///
/// Holds the count, sum, minimum and maximum of every score the scorer has
/// produced. Guarded by a mutex so the scorer can be shared across tasks and
/// read while in use.
#[derive(Debug, Default)]
pub struct ScoreStats {
    inner: Mutex<ScoreStatsSnapshot>,
}

/// Point-in-time copy of a [`ScoreStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreStatsSnapshot {
    pub count: u64,
    pub sum: f64,
    /// `None` until the first score is recorded
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ScoreStatsSnapshot {
    /// Mean score, or `0.0` before anything was recorded
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

impl ScoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, score: f64) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.count += 1;
        inner.sum += score;
        inner.min = Some(inner.min.map_or(score, |m| m.min(score)));
        inner.max = Some(inner.max.map_or(score, |m| m.max(score)));
    }

    pub fn snapshot(&self) -> ScoreStatsSnapshot {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
