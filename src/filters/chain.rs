use super::{Filter, FilterDecision, FilterStats, FilterStatsSnapshot};

/// Why a URL was refused by a [`FilterChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Name of the first filter that rejected the URL
    pub filter: &'static str,
    /// Position of that filter in the chain
    pub index: usize,
    pub reason: String,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} filter (#{}): {}", self.filter, self.index, self.reason)
    }
}

/// An ordered list of admission filters
///
/// Evaluation stops at the first rejecting filter, so later filters never see
/// (or count) a URL an earlier one refused. Reordering the chain can change
/// which rejection is reported but never whether a URL passes.
#[derive(Debug, Default)]
pub struct FilterChain {
    filters: Vec<Filter>,
    stats: FilterStats,
}

impl FilterChain {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self {
            filters,
            stats: FilterStats::new(),
        }
    }

    /// Appends a filter to the end of the chain
    pub fn with(mut self, filter: impl Into<Filter>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn push(&mut self, filter: impl Into<Filter>) {
        self.filters.push(filter.into());
    }

    /// Runs the chain and reports the first rejection, if any
    pub fn evaluate(&self, url: &str) -> Result<(), Rejection> {
        for (index, filter) in self.filters.iter().enumerate() {
            if let FilterDecision::Reject(reason) = filter.check(url) {
                self.stats.record(false);
                tracing::trace!("{} rejected by {} filter: {}", url, filter.name(), reason);
                return Err(Rejection {
                    filter: filter.name(),
                    index,
                    reason,
                });
            }
        }
        self.stats.record(true);
        Ok(())
    }

    /// Returns whether the URL passes every filter
    pub fn apply(&self, url: &str) -> bool {
        self.evaluate(url).is_ok()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Counters of the chain as a whole
    pub fn stats(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }

    /// Counters of each filter, in chain order
    pub fn filter_stats(&self) -> Vec<(&'static str, FilterStatsSnapshot)> {
        self.filters.iter().map(|f| (f.name(), f.stats())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ContentTypeFilter, DomainFilter, UrlPatternFilter};

    fn chain() -> FilterChain {
        FilterChain::default()
            .with(DomainFilter::allow(["a.com"]))
            .with(ContentTypeFilter::new(["text/html"]))
            .with(UrlPatternFilter::new(["*/admin*"], true).unwrap())
    }

    #[test]
    fn test_empty_chain_admits_everything() {
        let chain = FilterChain::default();
        assert!(chain.apply("https://anything.net/file.exe"));
        assert!(chain.is_empty());
    }

    #[test]
    fn test_first_rejection_is_reported() {
        let chain = chain();
        let rejection = chain.evaluate("https://b.com/admin/file.pdf").unwrap_err();
        assert_eq!(rejection.filter, "domain");
        assert_eq!(rejection.index, 0);

        let rejection = chain.evaluate("https://a.com/admin/file.pdf").unwrap_err();
        assert_eq!(rejection.filter, "content-type");

        let rejection = chain.evaluate("https://a.com/admin/users").unwrap_err();
        assert_eq!(rejection.filter, "url-pattern");

        assert!(chain.evaluate("https://a.com/docs/intro.html").is_ok());
    }

    #[test]
    fn test_short_circuit_skips_later_filters() {
        let chain = chain();
        chain.apply("https://b.com/x");

        let stats = chain.filter_stats();
        assert_eq!(stats[0].1.total_seen, 1);
        assert_eq!(stats[1].1.total_seen, 0);
        assert_eq!(stats[2].1.total_seen, 0);
        assert_eq!(chain.stats().rejected, 1);
    }

    #[test]
    fn test_order_changes_reason_not_outcome() {
        let forward = chain();
        let reversed = FilterChain::default()
            .with(UrlPatternFilter::new(["*/admin*"], true).unwrap())
            .with(ContentTypeFilter::new(["text/html"]))
            .with(DomainFilter::allow(["a.com"]));

        for url in [
            "https://b.com/admin/file.pdf",
            "https://a.com/page.html",
            "https://a.com/admin",
            "not a url",
        ] {
            assert_eq!(forward.apply(url), reversed.apply(url), "{}", url);
        }

        let url = "https://b.com/admin/file.pdf";
        assert_eq!(forward.evaluate(url).unwrap_err().filter, "domain");
        assert_eq!(reversed.evaluate(url).unwrap_err().filter, "url-pattern");
    }

    #[test]
    fn test_malformed_url_rejected_with_reason() {
        let chain = chain();
        let rejection = chain.evaluate("http://").unwrap_err();
        assert!(rejection.reason.contains("malformed"));
    }
}
