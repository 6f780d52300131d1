use crate::crawler::DEFAULT_BATCH_SIZE;
use serde::Deserialize;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlSettings,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    /// Admission filters, applied in file order
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
    /// Relevance scoring; absent means every URL scores 0
    #[serde(default)]
    pub scorer: Option<ScorerConfig>,
}

/// Crawl limits and behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// Maximum link-hop depth from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages to fetch (0 = unbounded)
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,

    /// Number of URLs fetched concurrently per iteration
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Whether links to other hosts are followed
    #[serde(rename = "follow-external-links", default)]
    pub follow_external_links: bool,

    /// Whether robots.txt is fetched and obeyed
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// Time allowed for one robots.txt fetch (seconds)
    #[serde(rename = "robots-timeout", default = "default_robots_timeout")]
    pub robots_timeout: u64,

    /// Per-page fetch timeout (seconds); the HTTP client default applies when unset
    #[serde(rename = "fetch-timeout", default)]
    pub fetch_timeout: Option<u64>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the token matched against robots.txt groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// `User-Agent` header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// One `[[filters]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterEntry {
    Domain {
        /// When present, only these hosts (or `*.` wildcards) pass
        #[serde(default)]
        allowed: Option<Vec<String>>,
        #[serde(default)]
        blocked: Vec<String>,
    },
    ContentType {
        /// MIME types admitted for URLs with a file extension
        #[serde(rename = "allowed-types")]
        allowed_types: Vec<String>,
    },
    UrlPattern {
        /// Globs or regular expressions, OR-combined
        patterns: Vec<String>,
        /// Reject matches instead of admitting them
        #[serde(default)]
        reverse: bool,
        /// Memoized URL decisions kept (0 disables the cache)
        #[serde(rename = "cache-size", default = "default_match_cache")]
        cache_size: usize,
    },
}

/// The `[scorer]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ScorerConfig {
    /// Divide the weighted sum by the number of components
    #[serde(default = "default_true")]
    pub normalize: bool,

    #[serde(default)]
    pub components: Vec<ScorerEntry>,
}

/// One `[[scorer.components]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScorerEntry {
    Keyword {
        keywords: Vec<String>,
        #[serde(rename = "case-sensitive", default)]
        case_sensitive: bool,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    PathDepth {
        #[serde(rename = "optimal-depth")]
        optimal_depth: u32,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    Freshness {
        /// Defaults to the current UTC year
        #[serde(rename = "current-year", default)]
        current_year: Option<i32>,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    ContentType {
        /// Checked in order; the first matching entry wins
        #[serde(rename = "type-weights")]
        type_weights: Vec<TypeWeight>,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    DomainAuthority {
        #[serde(rename = "domain-weights", default)]
        domain_weights: Vec<DomainWeight>,
        #[serde(rename = "default-weight", default)]
        default_weight: f64,
        #[serde(default = "default_weight")]
        weight: f64,
    },
}

/// Extension or regex pattern with its raw score
#[derive(Debug, Clone, Deserialize)]
pub struct TypeWeight {
    pub pattern: String,
    pub weight: f64,
}

/// Host (or `*.` wildcard) with its authority score
#[derive(Debug, Clone, Deserialize)]
pub struct DomainWeight {
    pub domain: String,
    pub weight: f64,
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

fn default_robots_timeout() -> u64 {
    10
}

fn default_match_cache() -> usize {
    crate::filters::DEFAULT_MATCH_CACHE
}

fn default_weight() -> f64 {
    1.0
}
