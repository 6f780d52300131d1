use crate::url::path_segment_count;
use url::Url;

/// Prefers URLs whose path depth is close to an optimal depth
///
/// `raw = 1 / (1 + |segments - optimal_depth|)`, so the optimal depth scores
/// `1.0` and each level away halves, thirds, ... the score.
#[derive(Debug, Clone)]
pub struct PathDepthScorer {
    optimal_depth: u32,
}

impl PathDepthScorer {
    pub fn new(optimal_depth: u32) -> Self {
        Self { optimal_depth }
    }

    pub fn optimal_depth(&self) -> u32 {
        self.optimal_depth
    }

    pub fn raw(&self, url: &str) -> f64 {
        let Ok(parsed) = Url::parse(url) else {
            return 0.0;
        };
        let segments = path_segment_count(&parsed) as u64;
        let distance = segments.abs_diff(u64::from(self.optimal_depth));
        1.0 / (1.0 + distance as f64)
    }
}
