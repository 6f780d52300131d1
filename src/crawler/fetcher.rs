//! Page fetching boundary
//!
//! The crawl controller only knows the [`PageFetcher`] trait: hand it a batch
//! of URLs, get back one [`PageResult`] per URL. [`HttpFetcher`] is a plain
//! reqwest implementation; browser pools or caches plug in the same way.

use super::parser::extract_links;
use crate::config::UserAgentConfig;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;

/// An outbound link found on a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL of the target
    ///
    /// A relative href is resolved against the page's normalized URL, which
    /// has no trailing slash, so `intro` found on `/docs/` lands on `/intro`.
    /// Fetchers should resolve hrefs against the URL they actually fetched.
    pub href: String,
    pub text: String,
}

impl Link {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Outcome of fetching one URL
///
/// `url` must be the URL exactly as it was requested; the controller
/// correlates results to requests by it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub url: String,
    pub success: bool,
    /// HTTP status, or 0 when no response was received
    pub status_code: u16,
    pub error_message: Option<String>,
    pub internal_links: Vec<Link>,
    pub external_links: Vec<Link>,
}

impl PageResult {
    pub fn success(url: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            success: true,
            status_code,
            error_message: None,
            internal_links: Vec::new(),
            external_links: Vec::new(),
        }
    }

    pub fn failure(url: impl Into<String>, status_code: u16, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            status_code,
            error_message: Some(error.into()),
            internal_links: Vec::new(),
            external_links: Vec::new(),
        }
    }

    pub fn with_links(mut self, internal: Vec<Link>, external: Vec<Link>) -> Self {
        self.internal_links = internal;
        self.external_links = external;
        self
    }
}

/// Per-run options handed through to the fetcher untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    /// Per-request timeout overriding the fetcher's own default
    pub timeout: Option<Duration>,
}

/// Fetches pages for the crawl controller
///
/// Implementations own per-URL timeouts and turn every failure into a
/// [`PageResult`] with `success == false`. Returning a result set that does
/// not match the requested URLs is a contract violation that ends the run.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, config: &RunConfig) -> PageResult;

    /// Fetches a batch concurrently, one result per URL
    async fn fetch_batch(&self, urls: &[String], config: &RunConfig) -> Vec<PageResult> {
        join_all(urls.iter().map(|url| self.fetch(url, config))).await
    }
}

/// Builds an HTTP client identifying the crawler
///
/// The user agent has the form `Name/Version (+ContactURL)`.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with reqwest and extracts anchors from HTML responses
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_user_agent(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, config: &RunConfig) -> PageResult {
        let mut request = self.client.get(url);
        if let Some(timeout) = config.timeout {
            request = request.timeout(timeout);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                tracing::debug!("Fetch of {} failed: {}", url, message);
                return PageResult::failure(url, 0, message);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return PageResult::failure(url, status.as_u16(), format!("HTTP {}", status));
        }

        let final_url = response.url().clone();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| ct.contains("text/html"));

        if !is_html {
            return PageResult::success(url, status.as_u16());
        }

        match response.text().await {
            Ok(body) => {
                let links = extract_links(&body, &final_url);
                PageResult::success(url, status.as_u16()).with_links(links.internal, links.external)
            }
            Err(e) => PageResult::failure(url, status.as_u16(), e.to_string()),
        }
    }
}
