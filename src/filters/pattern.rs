use super::{parse_candidate, FilterDecision, FilterStats, FilterStatsSnapshot};
use crate::ConfigError;
use lru::LruCache;
use regex::RegexSet;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Default number of memoized match results kept per pattern filter
pub const DEFAULT_MATCH_CACHE: usize = 10_000;

/// One URL pattern, either a shell-style glob or a regular expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// `*` matches any run of characters, `?` exactly one; the whole URL must match
    Glob(String),
    /// Searched anywhere in the URL unless the expression anchors itself
    Regex(String),
}

impl UrlPattern {
    /// Classifies a pattern string
    ///
    /// A `re:` prefix, or a leading `^` / trailing `$`, marks a regular
    /// expression. Everything else is a glob.
    pub fn parse(pattern: &str) -> Self {
        if let Some(expr) = pattern.strip_prefix("re:") {
            UrlPattern::Regex(expr.to_string())
        } else if pattern.starts_with('^') || pattern.ends_with('$') {
            UrlPattern::Regex(pattern.to_string())
        } else {
            UrlPattern::Glob(pattern.to_string())
        }
    }

    fn to_regex(&self) -> String {
        match self {
            UrlPattern::Regex(expr) => expr.clone(),
            UrlPattern::Glob(glob) => glob_to_regex(glob),
        }
    }
}

/// Translates a glob into an anchored regular expression
pub fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    let mut literal = String::new();

    for ch in glob.chars() {
        match ch {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if ch == '*' { ".*" } else { "." });
            }
            other => literal.push(other),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Admits URLs matching any of a set of patterns
///
/// All patterns are compiled once into a single [`RegexSet`] at construction.
/// With `reverse` set the filter becomes a block list: a match rejects.
/// Match results are memoized per URL in a bounded LRU cache; the cache never
/// changes an outcome, it only skips re-running the regex set.
#[derive(Debug)]
pub struct UrlPatternFilter {
    patterns: Vec<UrlPattern>,
    set: RegexSet,
    reverse: bool,
    cache: Option<Mutex<LruCache<String, bool>>>,
    stats: FilterStats,
}

impl UrlPatternFilter {
    /// Builds a filter from pattern strings (see [`UrlPattern::parse`])
    pub fn new<I, S>(patterns: I, reverse: bool) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| UrlPattern::parse(p.as_ref()))
            .collect();
        Self::from_patterns(patterns, reverse)
    }

    /// Builds a filter from already classified patterns
    pub fn from_patterns(patterns: Vec<UrlPattern>, reverse: bool) -> Result<Self, ConfigError> {
        if patterns.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "a URL pattern filter needs at least one pattern".to_string(),
            ));
        }

        let set = RegexSet::new(patterns.iter().map(UrlPattern::to_regex))
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            patterns,
            set,
            reverse,
            cache: NonZeroUsize::new(DEFAULT_MATCH_CACHE).map(|cap| Mutex::new(LruCache::new(cap))),
            stats: FilterStats::new(),
        })
    }

    /// Replaces the match cache with one of the given capacity (0 disables it)
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        self
    }

    pub fn patterns(&self) -> &[UrlPattern] {
        &self.patterns
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn check(&self, url: &str) -> FilterDecision {
        let decision = match parse_candidate(url) {
            Err(rejection) => rejection,
            Ok(_) => match (self.matches(url), self.reverse) {
                (true, false) | (false, true) => FilterDecision::Pass,
                (true, true) => FilterDecision::Reject("URL matches a blocked pattern".to_string()),
                (false, false) => FilterDecision::Reject("URL matches no allowed pattern".to_string()),
            },
        };
        self.stats.record(decision.is_pass());
        decision
    }

    fn matches(&self, url: &str) -> bool {
        let Some(cache) = &self.cache else {
            return self.set.is_match(url);
        };

        if let Ok(mut guard) = cache.lock() {
            if let Some(hit) = guard.get(url) {
                return *hit;
            }
        }

        let matched = self.set.is_match(url);
        if let Ok(mut guard) = cache.lock() {
            guard.put(url.to_string(), matched);
        }
        matched
    }

    pub fn stats(&self) -> FilterStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_translation_is_anchored() {
        assert_eq!(glob_to_regex("*blog*"), "^.*blog.*$");
        assert_eq!(glob_to_regex("https://a.com/?"), r"^https://a\.com/.$");
    }

    #[test]
    fn test_pattern_classification() {
        assert_eq!(UrlPattern::parse("*docs*"), UrlPattern::Glob("*docs*".into()));
        assert_eq!(UrlPattern::parse("^https://"), UrlPattern::Regex("^https://".into()));
        assert_eq!(UrlPattern::parse(r"\.pdf$"), UrlPattern::Regex(r"\.pdf$".into()));
        assert_eq!(UrlPattern::parse("re:/v\\d+/"), UrlPattern::Regex("/v\\d+/".into()));
    }

    #[test]
    fn test_any_pattern_admits() {
        let filter = UrlPatternFilter::new(["*/docs/*", "*/blog/*"], false).unwrap();
        assert!(filter.check("https://a.com/docs/intro").is_pass());
        assert!(filter.check("https://a.com/blog/post").is_pass());
        assert!(!filter.check("https://a.com/shop/item").is_pass());
    }

    #[test]
    fn test_glob_must_match_whole_url() {
        let filter = UrlPatternFilter::new(["docs*"], false).unwrap();
        assert!(!filter.check("https://a.com/docs/intro").is_pass());
    }

    #[test]
    fn test_regex_pattern() {
        let filter = UrlPatternFilter::new([r"re:/20\d\d/"], false).unwrap();
        assert!(filter.check("https://news.com/2023/05/story").is_pass());
        assert!(!filter.check("https://news.com/about").is_pass());
    }

    #[test]
    fn test_reverse_blocks_matches() {
        let filter = UrlPatternFilter::new(["*login*", "*/cart*"], true).unwrap();
        assert!(!filter.check("https://shop.com/login").is_pass());
        assert!(!filter.check("https://shop.com/cart?id=3").is_pass());
        assert!(filter.check("https://shop.com/products").is_pass());
    }

    #[test]
    fn test_malformed_url_rejected_even_when_patterns_would_admit() {
        let allow_all = UrlPatternFilter::new(["*"], false).unwrap();
        let decision = allow_all.check("not a url");
        assert!(matches!(&decision, FilterDecision::Reject(reason) if reason.contains("malformed URL")));

        let block_admin = UrlPatternFilter::new(["*/admin*"], true).unwrap();
        assert!(!block_admin.check("::::garbage").is_pass());
        assert_eq!(block_admin.stats().rejected, 1);
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let result = UrlPatternFilter::new(["re:(unclosed"], false);
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_empty_pattern_list_is_config_error() {
        let result = UrlPatternFilter::new(Vec::<String>::new(), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_does_not_change_outcome() {
        let cached = UrlPatternFilter::new(["*rust*"], false).unwrap().with_cache_capacity(2);
        let uncached = UrlPatternFilter::new(["*rust*"], false).unwrap().with_cache_capacity(0);
        let urls = [
            "https://a.com/rust",
            "https://a.com/go",
            "https://a.com/rust",
            "https://a.com/zig",
            "https://a.com/go",
        ];
        for url in urls {
            assert_eq!(cached.check(url), uncached.check(url));
        }
        assert_eq!(cached.stats(), uncached.stats());
    }
}
