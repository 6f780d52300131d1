use chrono::{DateTime, Utc};
use std::fmt;

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Created, nothing popped yet
    Idle,
    /// Popping batches and admitting discovered links
    Running,
    /// `max_pages` reached; finishing the in-flight batch without admitting links
    Draining,
    /// Stopped by the caller or by a fatal fetcher error
    Cancelled,
    /// Frontier exhausted or draining finished
    Completed,
}

impl CrawlState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CrawlState::Cancelled | CrawlState::Completed)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlState::Idle => "idle",
            CrawlState::Running => "running",
            CrawlState::Draining => "draining",
            CrawlState::Cancelled => "cancelled",
            CrawlState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Counters for one crawl run
///
/// Owned and updated by the crawl controller; callers see snapshots through
/// [`super::CrawlHandle::stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStats {
    pub started_at: DateTime<Utc>,
    /// Fetch results produced, successful or not
    pub urls_processed: u64,
    pub urls_failed: u64,
    /// Discovered links refused by robots.txt, a filter, or URL parsing
    pub urls_skipped: u64,
    /// Subset of `urls_skipped` refused by robots.txt
    pub robots_blocked: u64,
    pub max_depth_reached: u32,
    /// Depth of the most recently processed result
    pub current_depth: u32,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            urls_processed: 0,
            urls_failed: 0,
            urls_skipped: 0,
            robots_blocked: 0,
            max_depth_reached: 0,
            current_depth: 0,
        }
    }

    pub fn urls_succeeded(&self) -> u64 {
        self.urls_processed - self.urls_failed
    }

    /// Seconds since the run started
    pub fn elapsed_secs(&self) -> f64 {
        (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} failed={} skipped={} robots_blocked={} max_depth={}",
            self.urls_processed,
            self.urls_failed,
            self.urls_skipped,
            self.robots_blocked,
            self.max_depth_reached
        )
    }
}
