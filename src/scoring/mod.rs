//! Relevance scoring
//!
//! Each sub-scorer maps a URL to a raw score in `[0, 1]`. A [`Scorer`] pairs
//! one of the five built-in heuristics with a weight and its own counters, and
//! a [`CompositeScorer`] sums the weighted scores (optionally averaged).
//!
//! Higher composite scores mean more relevant URLs. The frontier pops the
//! lowest key first, so the crawl controller enqueues the negated score.

mod composite;
mod content_type;
mod domain_authority;
mod freshness;
mod keyword;
mod path_depth;
mod stats;

pub use composite::CompositeScorer;
pub use content_type::{ContentTypeScorer, TypeMatcher};
pub use domain_authority::DomainAuthorityScorer;
pub use freshness::{latest_year, FreshnessScorer, UNKNOWN_FRESHNESS};
pub use keyword::KeywordRelevanceScorer;
pub use path_depth::PathDepthScorer;
pub use stats::{ScoreStats, ScoreStatsSnapshot};

use crate::ConfigError;

/// The closed set of scoring heuristics
#[derive(Debug, Clone)]
pub enum ScorerKind {
    Keyword(KeywordRelevanceScorer),
    PathDepth(PathDepthScorer),
    Freshness(FreshnessScorer),
    ContentType(ContentTypeScorer),
    DomainAuthority(DomainAuthorityScorer),
}

impl ScorerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScorerKind::Keyword(_) => "keyword",
            ScorerKind::PathDepth(_) => "path-depth",
            ScorerKind::Freshness(_) => "freshness",
            ScorerKind::ContentType(_) => "content-type",
            ScorerKind::DomainAuthority(_) => "domain-authority",
        }
    }

    /// Raw score in `[0, 1]`
    pub fn raw(&self, url: &str) -> f64 {
        let raw = match self {
            ScorerKind::Keyword(s) => s.raw(url),
            ScorerKind::PathDepth(s) => s.raw(url),
            ScorerKind::Freshness(s) => s.raw(url),
            ScorerKind::ContentType(s) => s.raw(url),
            ScorerKind::DomainAuthority(s) => s.raw(url),
        };
        raw.clamp(0.0, 1.0)
    }
}

/// One weighted sub-scorer
#[derive(Debug)]
pub struct Scorer {
    kind: ScorerKind,
    weight: f64,
    stats: ScoreStats,
}

impl Scorer {
    /// Wraps a heuristic with a weight
    ///
    /// The weight must be finite and non-negative.
    pub fn new(kind: ScorerKind, weight: f64) -> Result<Self, ConfigError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} scorer weight must be finite and >= 0, got {}",
                kind.name(),
                weight
            )));
        }
        Ok(Self {
            kind,
            weight,
            stats: ScoreStats::new(),
        })
    }

    pub fn keyword<I, S>(keywords: I, case_sensitive: bool, weight: f64) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            ScorerKind::Keyword(KeywordRelevanceScorer::new(keywords, case_sensitive)),
            weight,
        )
    }

    pub fn path_depth(optimal_depth: u32, weight: f64) -> Result<Self, ConfigError> {
        Self::new(ScorerKind::PathDepth(PathDepthScorer::new(optimal_depth)), weight)
    }

    pub fn freshness(current_year: i32, weight: f64) -> Result<Self, ConfigError> {
        Self::new(ScorerKind::Freshness(FreshnessScorer::new(current_year)), weight)
    }

    pub fn content_type<I, S>(type_weights: I, weight: f64) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self::new(ScorerKind::ContentType(ContentTypeScorer::new(type_weights)?), weight)
    }

    pub fn domain_authority<I, S>(
        domain_weights: I,
        default_weight: f64,
        weight: f64,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self::new(
            ScorerKind::DomainAuthority(DomainAuthorityScorer::new(domain_weights, default_weight)?),
            weight,
        )
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn kind(&self) -> &ScorerKind {
        &self.kind
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Raw score in `[0, 1]`, not recorded
    pub fn raw(&self, url: &str) -> f64 {
        self.kind.raw(url)
    }

    /// Weighted score (`raw * weight`), recorded in this scorer's counters
    pub fn score(&self, url: &str) -> f64 {
        let weighted = self.kind.raw(url) * self.weight;
        self.stats.record(weighted);
        weighted
    }

    pub fn stats(&self) -> ScoreStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_score_recorded() {
        let scorer = Scorer::path_depth(2, 0.5).unwrap();
        assert_eq!(scorer.raw("https://x.com/a"), 0.5);
        assert_eq!(scorer.score("https://x.com/a"), 0.25);
        assert_eq!(scorer.score("https://x.com/a/b"), 0.5);

        let stats = scorer.stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, Some(0.25));
        assert_eq!(stats.max, Some(0.5));
    }

    #[test]
    fn test_invalid_weight() {
        assert!(Scorer::path_depth(1, -1.0).is_err());
        assert!(Scorer::path_depth(1, f64::INFINITY).is_err());
    }

    #[test]
    fn test_raw_scores_stay_in_unit_range() {
        let scorers = vec![
            Scorer::keyword(["rust", "web"], false, 1.0).unwrap(),
            Scorer::path_depth(3, 1.0).unwrap(),
            Scorer::freshness(2024, 1.0).unwrap(),
            Scorer::content_type([("html", 1.0), ("pdf", 0.4)], 1.0).unwrap(),
            Scorer::domain_authority([("a.com", 0.9)], 0.1, 1.0).unwrap(),
        ];
        let urls = [
            "https://a.com",
            "https://a.com/",
            "https://a.com/rust/web/2024/01/01/x.html",
            "https://a.com/a/b/c/d/e/f/g/h/i/j/k",
            "https://a.com/file",
            "http://b.com:8080/1800/old.pdf?q=%FF#frag",
            "",
            "not a url at all",
        ];
        for scorer in &scorers {
            for url in urls {
                let raw = scorer.raw(url);
                assert!((0.0..=1.0).contains(&raw), "{} gave {} for {:?}", scorer.name(), raw, url);
            }
        }
    }
}
