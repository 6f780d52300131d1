use super::{parse_candidate, FilterDecision, FilterStats, FilterStatsSnapshot};
use crate::url::{extract_domain, matches_wildcard};

/// Admits URLs by host
///
/// A host on the block list is always rejected. When an allow list is
/// configured, only hosts on it are admitted. Entries are either exact hosts
/// or `*.example.com` wildcards (see [`matches_wildcard`]).
#[derive(Debug)]
pub struct DomainFilter {
    allowed: Option<Vec<String>>,
    blocked: Vec<String>,
    stats: FilterStats,
}

impl DomainFilter {
    /// Creates a domain filter
    ///
    /// # Arguments
    ///
    /// * `allowed` - Hosts to admit exclusively, or `None` to admit any host not blocked
    /// * `blocked` - Hosts to always reject
    pub fn new<A, B, S>(allowed: Option<A>, blocked: B) -> Self
    where
        A: IntoIterator<Item = S>,
        B: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed.map(lowercase_all),
            blocked: lowercase_all(blocked),
            stats: FilterStats::new(),
        }
    }

    /// Admits only the given hosts
    pub fn allow<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Some(domains), Vec::<S>::new())
    }

    /// Admits every host except the given ones
    pub fn block<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(None::<Vec<S>>, domains)
    }

    /// Applies the filter to a URL and records the outcome
    pub fn check(&self, url: &str) -> FilterDecision {
        let decision = self.decide(url);
        self.stats.record(decision.is_pass());
        decision
    }

    fn decide(&self, url: &str) -> FilterDecision {
        let parsed = match parse_candidate(url) {
            Ok(parsed) => parsed,
            Err(rejection) => return rejection,
        };
        let Some(host) = extract_domain(&parsed) else {
            return FilterDecision::Reject("URL has no host".to_string());
        };

        if self.blocked.iter().any(|entry| matches_wildcard(entry, &host)) {
            return FilterDecision::Reject(format!("domain {} is blocked", host));
        }

        if let Some(allowed) = &self.allowed {
            if !allowed.iter().any(|entry| matches_wildcard(entry, &host)) {
                return FilterDecision::Reject(format!("domain {} is not allowed", host));
            }
        }

        FilterDecision::Pass
    }

    pub fn stats(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }
}

fn lowercase_all<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    domains
        .into_iter()
        .map(|d| d.as_ref().trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
