//! Per-run robots.txt cache
//!
//! Each origin's robots.txt is fetched at most once per cache instance. The
//! first caller for an origin performs the fetch while concurrent callers for
//! the same origin wait on that origin's cell; other origins proceed
//! independently. Failed fetches are cached as "no rules" and never retried.

use super::{ParsedRobots, RobotsSource};
use crate::url::origin_key;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// Default time allowed for one robots.txt fetch
pub const DEFAULT_ROBOTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Cached robots.txt outcome for one origin
#[derive(Debug, Clone)]
pub struct RobotsEntry {
    /// `scheme://host[:port]` the rules apply to
    pub domain: String,

    /// Compiled rules, or `None` when the fetch failed (treated as allow-all)
    pub parser: Option<ParsedRobots>,

    /// When the fetch attempt finished
    pub fetched_at: DateTime<Utc>,
}

impl RobotsEntry {
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.parser
            .as_ref()
            .map_or(true, |rules| rules.is_allowed(url, user_agent))
    }
}

type Slot = Arc<OnceCell<RobotsEntry>>;

/// Politeness cache answering "may this URL be fetched?"
pub struct RobotsCache {
    source: Arc<dyn RobotsSource>,
    user_agent: String,
    fetch_timeout: Duration,
    slots: Mutex<HashMap<String, Slot>>,
    fetches: AtomicU64,
}

impl RobotsCache {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `source` - Where robots.txt bodies come from
    /// * `user_agent` - Product token matched against `User-agent` lines (e.g. `"FrontierBot"`)
    pub fn new(source: Arc<dyn RobotsSource>, user_agent: impl Into<String>) -> Self {
        Self {
            source,
            user_agent: user_agent.into(),
            fetch_timeout: DEFAULT_ROBOTS_TIMEOUT,
            slots: Mutex::new(HashMap::new()),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Checks whether robots.txt allows fetching the URL
    ///
    /// Malformed URLs and URLs without a host are never fetchable.
    pub async fn can_fetch(&self, url: &str) -> bool {
        match self.entry_for(url).await {
            Some(entry) => entry.is_allowed(url, &self.user_agent),
            None => {
                tracing::debug!("Cannot evaluate robots.txt for malformed URL {}", url);
                false
            }
        }
    }

    /// Returns the crawl delay the URL's origin asks for, fetching robots.txt if needed
    pub async fn crawl_delay(&self, url: &str) -> Option<Duration> {
        let entry = self.entry_for(url).await?;
        let seconds = entry.parser.as_ref()?.crawl_delay(&self.user_agent)?;
        Duration::try_from_secs_f64(seconds).ok()
    }

    /// Returns the cached entry for the URL's origin, fetching it on first use
    pub async fn entry_for(&self, url: &str) -> Option<RobotsEntry> {
        let parsed = Url::parse(url).ok()?;
        let key = origin_key(&parsed)?;
        let slot = self.slot(&key);
        let entry = slot.get_or_init(|| self.load(key.clone())).await;
        Some(entry.clone())
    }

    /// Returns the already cached entry for an origin key without fetching
    pub fn cached(&self, origin: &str) -> Option<RobotsEntry> {
        let slots = self.slots.lock().ok()?;
        slots.get(origin)?.get().cloned()
    }

    /// Number of origins with a settled entry
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.values().filter(|slot| slot.initialized()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of robots.txt fetches attempted so far
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.entry(key.to_string()).or_default().clone()
    }

    async fn load(&self, domain: String) -> RobotsEntry {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let robots_url = format!("{}/robots.txt", domain);
        tracing::debug!("Fetching {}", robots_url);

        let outcome = tokio::time::timeout(self.fetch_timeout, self.source.fetch(&robots_url)).await;

        let parser = match outcome {
            Ok(Ok(body)) => {
                let parsed = ParsedRobots::parse(&body);
                if parsed.is_none() {
                    tracing::warn!("Unparsable robots.txt at {}, allowing all", robots_url);
                }
                parsed
            }
            Ok(Err(e)) => {
                tracing::warn!("robots.txt fetch failed for {}: {}, allowing all", domain, e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "robots.txt fetch for {} timed out after {:?}, allowing all",
                    domain,
                    self.fetch_timeout
                );
                None
            }
        };

        RobotsEntry {
            domain,
            parser,
            fetched_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for RobotsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotsCache")
            .field("user_agent", &self.user_agent)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("origins", &self.len())
            .finish()
    }
}
