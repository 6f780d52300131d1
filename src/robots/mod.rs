//! Robots.txt handling module
//!
//! This module fetches, parses, and caches robots.txt files so the crawl
//! controller can ask whether a discovered URL may be fetched. Bodies come from
//! a [`RobotsSource`]; [`HttpRobotsSource`] is the reqwest-backed one.

mod cache;
mod parser;

pub use cache::{RobotsCache, RobotsEntry, DEFAULT_ROBOTS_TIMEOUT};
pub use parser::ParsedRobots;

use crate::RobotsError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Somewhere robots.txt bodies can be retrieved from
#[async_trait]
pub trait RobotsSource: Send + Sync {
    /// Fetches the body of a robots.txt URL
    ///
    /// Anything other than a successful, complete body is an error; the cache
    /// turns errors into an allow-all entry.
    async fn fetch(&self, robots_url: &str) -> Result<String, RobotsError>;
}

/// Fetches robots.txt over HTTP
#[derive(Debug, Clone)]
pub struct HttpRobotsSource {
    client: Client,
}

impl HttpRobotsSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RobotsSource for HttpRobotsSource {
    async fn fetch(&self, robots_url: &str) -> Result<String, RobotsError> {
        let response = self.client.get(robots_url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(RobotsError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
