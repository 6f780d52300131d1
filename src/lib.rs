//! crawl-frontier: a deep-crawl frontier engine
//!
//! This crate decides which discovered URL a crawler fetches next, whether it is
//! allowed to fetch it at all, and how it is prioritized. It combines a
//! breadth-first frontier, an admission filter chain, a weighted relevance
//! scorer and a per-domain robots.txt cache behind a single streaming entry
//! point, [`crawler::crawl`].

pub mod config;
pub mod crawler;
pub mod filters;
pub mod robots;
pub mod scoring;
pub mod url;

use thiserror::Error;

/// Main error type for frontier operations
///
/// Only conditions that make a crawl run impossible to continue end up here.
/// Fetch failures and admission rejections are reported through
/// [`crawler::PageResult`] fields and [`crawler::CrawlStats`] instead.
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Page fetcher contract violated: {0}")]
    FetcherContract(String),

    #[error("Fetch task aborted: {0}")]
    FetchTask(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Reasons a robots.txt could not be retrieved
///
/// Never surfaced to crawl callers: the robots cache logs these and falls
/// back to "no rules" for the origin.
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for frontier operations
pub type Result<T> = std::result::Result<T, FrontierError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    crawl, CrawlConfig, CrawlHandle, CrawlResult, CrawlState, CrawlStats, Link, PageFetcher,
    PageResult,
};
pub use filters::{Filter, FilterChain};
pub use robots::RobotsCache;
pub use scoring::{CompositeScorer, Scorer};
pub use crate::url::{extract_domain, normalize_url};
