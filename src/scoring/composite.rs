use super::{ScoreStats, ScoreStatsSnapshot, Scorer};

/// Weighted combination of sub-scorers
///
/// `score = sum(raw_i * weight_i)`, divided by the number of sub-scorers when
/// `normalize` is set. A composite with no sub-scorers scores everything `0.0`.
#[derive(Debug)]
pub struct CompositeScorer {
    scorers: Vec<Scorer>,
    normalize: bool,
    stats: ScoreStats,
}

impl CompositeScorer {
    /// Creates a normalizing composite
    pub fn new(scorers: Vec<Scorer>) -> Self {
        Self::with_normalize(scorers, true)
    }

    pub fn with_normalize(scorers: Vec<Scorer>, normalize: bool) -> Self {
        Self {
            scorers,
            normalize,
            stats: ScoreStats::new(),
        }
    }

    /// Computes and records the composite score of a URL
    pub fn score(&self, url: &str) -> f64 {
        if self.scorers.is_empty() {
            self.stats.record(0.0);
            return 0.0;
        }

        let total: f64 = self.scorers.iter().map(|s| s.score(url)).sum();
        let score = if self.normalize {
            total / self.scorers.len() as f64
        } else {
            total
        };

        self.stats.record(score);
        score
    }

    /// Weighted contribution of each sub-scorer, without recording anything
    pub fn breakdown(&self, url: &str) -> Vec<(&'static str, f64)> {
        self.scorers
            .iter()
            .map(|s| (s.name(), s.raw(url) * s.weight()))
            .collect()
    }

    pub fn scorers(&self) -> &[Scorer] {
        &self.scorers
    }

    pub fn is_normalized(&self) -> bool {
        self.normalize
    }

    pub fn stats(&self) -> ScoreStatsSnapshot {
        self.stats.snapshot()
    }
}
