//! Crawler module: the frontier and the loop that drives it
//!
//! - [`Frontier`]: priority queue, visited set and depth map for one run
//! - [`crawl`]: spawns the controller and returns a [`CrawlHandle`] stream
//! - [`PageFetcher`]: the boundary to whatever actually fetches pages
//! - [`HttpFetcher`]: reqwest + scraper implementation of that boundary

mod controller;
mod fetcher;
mod frontier;
mod parser;
mod stats;

pub use controller::{crawl, CrawlConfig, CrawlHandle, CrawlResult, DEFAULT_BATCH_SIZE};
pub use fetcher::{build_http_client, HttpFetcher, Link, PageFetcher, PageResult, RunConfig};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{extract_links, PageLinks};
pub use stats::{CrawlState, CrawlStats};
