//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning them into the filter chain, scorer, and [`CrawlConfig`]
//! a crawl runs with.
//!
//! # Example
//!
//! ```no_run
//! use crawl_frontier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawl.max_depth);
//! ```
//!
//! [`CrawlConfig`]: crate::crawler::CrawlConfig

mod builder;
mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlSettings, DomainWeight, FilterEntry, ScorerConfig, ScorerEntry, TypeWeight,
    UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
