//! Admission filters
//!
//! A filter is a pure predicate over a candidate URL that decides whether the
//! URL may enter the frontier at all. The vocabulary is closed: domain,
//! content-type (by extension) and URL pattern filters, wrapped in the
//! [`Filter`] enum and composed by a [`FilterChain`].
//!
//! Every filter owns its own [`FilterStats`] counters. Filters are `Send + Sync`
//! and immutable apart from those counters and the pattern match cache.

mod chain;
mod content_type;
mod domain;
mod pattern;
mod stats;

pub use chain::{FilterChain, Rejection};
pub use content_type::{mime_for_extension, ContentTypeFilter};
pub use domain::DomainFilter;
pub use pattern::{glob_to_regex, UrlPattern, UrlPatternFilter, DEFAULT_MATCH_CACHE};
pub use stats::{FilterStats, FilterStatsSnapshot};

use url::Url;

/// Outcome of applying one filter to one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Pass,
    Reject(String),
}

impl FilterDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, FilterDecision::Pass)
    }
}

/// Parses a candidate URL, turning parse failures into a rejection
fn parse_candidate(url: &str) -> Result<Url, FilterDecision> {
    Url::parse(url).map_err(|e| FilterDecision::Reject(format!("malformed URL: {}", e)))
}

/// The closed set of admission filters
#[derive(Debug)]
pub enum Filter {
    Domain(DomainFilter),
    ContentType(ContentTypeFilter),
    UrlPattern(UrlPatternFilter),
}

impl Filter {
    /// Short name used in rejection reasons and stats reports
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Domain(_) => "domain",
            Filter::ContentType(_) => "content-type",
            Filter::UrlPattern(_) => "url-pattern",
        }
    }

    /// Applies the filter, recording the decision in its counters
    pub fn check(&self, url: &str) -> FilterDecision {
        match self {
            Filter::Domain(f) => f.check(url),
            Filter::ContentType(f) => f.check(url),
            Filter::UrlPattern(f) => f.check(url),
        }
    }

    /// Returns whether the URL passes this filter
    pub fn apply(&self, url: &str) -> bool {
        self.check(url).is_pass()
    }

    pub fn stats(&self) -> FilterStatsSnapshot {
        match self {
            Filter::Domain(f) => f.stats(),
            Filter::ContentType(f) => f.stats(),
            Filter::UrlPattern(f) => f.stats(),
        }
    }
}

impl From<DomainFilter> for Filter {
    fn from(filter: DomainFilter) -> Self {
        Filter::Domain(filter)
    }
}

impl From<ContentTypeFilter> for Filter {
    fn from(filter: ContentTypeFilter) -> Self {
        Filter::ContentType(filter)
    }
}

impl From<UrlPatternFilter> for Filter {
    fn from(filter: UrlPatternFilter) -> Self {
        Filter::UrlPattern(filter)
    }
}
