//! Crawl controller
//!
//! One spawned task owns the frontier and the run's counters. Each iteration
//! pops a batch, hands it to the fetcher on a separate task, waits for the
//! whole batch (or cancellation), admits the links the results carry, and
//! sends every result down a bounded channel that the caller reads as a
//! stream.

use super::fetcher::{PageFetcher, PageResult, RunConfig};
use super::frontier::{Frontier, FrontierEntry};
use super::stats::{CrawlState, CrawlStats};
use crate::filters::FilterChain;
use crate::robots::RobotsCache;
use crate::scoring::CompositeScorer;
use crate::url::normalize_url;
use crate::{FrontierError, UrlError};
use futures::future::join_all;
use futures::Stream;
use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default number of URLs dispatched to the fetcher per iteration
pub const DEFAULT_BATCH_SIZE: u32 = 3;

/// Settings for one crawl run
#[derive(Clone)]
pub struct CrawlConfig {
    /// Deepest link-hop distance from the start URL that is fetched
    pub max_depth: u32,
    /// Results to produce before stopping; 0 means unbounded
    pub max_pages: u32,
    /// URLs fetched concurrently per iteration; 0 is treated as 1
    pub batch_size: u32,
    pub follow_external_links: bool,
    pub filter_chain: Arc<FilterChain>,
    /// `None` scores every URL 0, giving FIFO order within a depth
    pub scorer: Option<Arc<CompositeScorer>>,
    /// `None` skips robots.txt checks
    pub robots: Option<Arc<RobotsCache>>,
    pub run_config: RunConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            follow_external_links: false,
            filter_chain: Arc::new(FilterChain::default()),
            scorer: None,
            robots: None,
            run_config: RunConfig::default(),
        }
    }
}

impl std::fmt::Debug for CrawlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlConfig")
            .field("max_depth", &self.max_depth)
            .field("max_pages", &self.max_pages)
            .field("batch_size", &self.batch_size)
            .field("follow_external_links", &self.follow_external_links)
            .field("filters", &self.filter_chain.len())
            .field("scorer", &self.scorer.is_some())
            .field("robots", &self.robots.is_some())
            .finish()
    }
}

/// A fetch result together with where it sat in the crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlResult {
    pub page: PageResult,
    pub depth: u32,
    /// Composite relevance score the URL was enqueued with
    pub score: f64,
}

/// Caller side of a running crawl
///
/// Implements [`Stream`]; the stream ends when the crawl completes or is
/// cancelled. A fatal fetcher error is delivered as the last item. Dropping
/// the handle stops the crawl after its current batch.
pub struct CrawlHandle {
    results: ReceiverStream<Result<CrawlResult, FrontierError>>,
    cancel: CancellationToken,
    stats: watch::Receiver<CrawlStats>,
    state: watch::Receiver<CrawlState>,
}

impl CrawlHandle {
    /// Requests cancellation; no new batch is started afterwards
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Latest counters published by the controller
    pub fn stats(&self) -> CrawlStats {
        self.stats.borrow().clone()
    }

    pub fn state(&self) -> CrawlState {
        *self.state.borrow()
    }
}

impl Stream for CrawlHandle {
    type Item = Result<CrawlResult, FrontierError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.results).poll_next(cx)
    }
}

/// Starts a crawl at `start_url` and returns its result stream
///
/// The start URL is normalized but not run through robots.txt or the filter
/// chain. Must be called inside a tokio runtime.
pub fn crawl(
    start_url: &str,
    config: CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<CrawlHandle, FrontierError> {
    let start = normalize_url(start_url)?;

    let batch_size = config.batch_size.max(1) as usize;
    let (tx, rx) = mpsc::channel(batch_size);
    let (stats_tx, stats_rx) = watch::channel(CrawlStats::new());
    let (state_tx, state_rx) = watch::channel(CrawlState::Idle);
    let cancel = CancellationToken::new();

    let controller = Controller {
        config,
        batch_size,
        fetcher,
        frontier: Frontier::new(),
        scores: HashMap::new(),
        stats: CrawlStats::new(),
        tx,
        stats_tx,
        state_tx,
        cancel: cancel.clone(),
    };
    tokio::spawn(controller.run(start.to_string()));

    Ok(CrawlHandle {
        results: ReceiverStream::new(rx),
        cancel,
        stats: stats_rx,
        state: state_rx,
    })
}

enum BatchOutcome {
    Done(Vec<PageResult>),
    Cancelled,
    Fatal(FrontierError),
}

struct Controller {
    config: CrawlConfig,
    batch_size: usize,
    fetcher: Arc<dyn PageFetcher>,
    frontier: Frontier,
    scores: HashMap<String, f64>,
    stats: CrawlStats,
    tx: mpsc::Sender<Result<CrawlResult, FrontierError>>,
    stats_tx: watch::Sender<CrawlStats>,
    state_tx: watch::Sender<CrawlState>,
    cancel: CancellationToken,
}

impl Controller {
    async fn run(mut self, start: String) {
        tracing::info!("Starting crawl at {} ({:?})", start, self.config);
        self.frontier.push(start, 0, 0.0);
        self.set_state(CrawlState::Running);

        let final_state = self.run_loop().await;

        let dropped = self.frontier.discard_queued();
        if dropped > 0 {
            tracing::debug!("Discarded {} queued URLs", dropped);
        }
        self.set_state(final_state);
        tracing::info!("Crawl {}: {}", final_state, self.stats);
    }

    async fn run_loop(&mut self) -> CrawlState {
        loop {
            if self.cancel.is_cancelled() {
                return CrawlState::Cancelled;
            }

            let room = self.remaining_pages().unwrap_or(self.batch_size);
            let batch = self.frontier.pop_batch(room.min(self.batch_size));
            if batch.is_empty() {
                return CrawlState::Completed;
            }

            let urls: Vec<String> = batch.iter().map(|e| e.url.clone()).collect();
            tracing::debug!("Dispatching batch of {}: {:?}", urls.len(), urls);

            let results = match self.dispatch(urls).await {
                BatchOutcome::Done(results) => results,
                BatchOutcome::Cancelled => return CrawlState::Cancelled,
                BatchOutcome::Fatal(e) => {
                    tracing::error!("Stopping crawl: {}", e);
                    let _ = self.tx.send(Err(e)).await;
                    return CrawlState::Cancelled;
                }
            };

            let draining = self.config.max_pages > 0
                && self.stats.urls_processed + results.len() as u64 >= u64::from(self.config.max_pages);
            if draining {
                tracing::info!("Reached max pages ({}), draining", self.config.max_pages);
                self.set_state(CrawlState::Draining);
            }

            for (entry, page) in batch.into_iter().zip(results) {
                self.record(&entry, &page);
                if page.success && !draining {
                    self.discover(&entry, &page).await;
                }
                self.stats_tx.send_replace(self.stats.clone());

                let result = CrawlResult {
                    score: self.scores.remove(&entry.url).unwrap_or(0.0),
                    depth: entry.depth,
                    page,
                };
                if !self.emit(result).await {
                    return CrawlState::Cancelled;
                }
            }

            if draining {
                return CrawlState::Completed;
            }
        }
    }

    fn remaining_pages(&self) -> Option<usize> {
        if self.config.max_pages == 0 {
            return None;
        }
        let left = u64::from(self.config.max_pages).saturating_sub(self.stats.urls_processed);
        Some(usize::try_from(left).unwrap_or(usize::MAX))
    }

    /// Runs the batch on its own task and waits for all of it
    ///
    /// Results come back in request order. Cancellation wins over an
    /// unfinished batch; the fetch task is left to finish on its own.
    async fn dispatch(&self, urls: Vec<String>) -> BatchOutcome {
        let fetcher = self.fetcher.clone();
        let run_config = self.config.run_config.clone();
        let requested = urls.clone();
        let task = tokio::spawn(async move { fetcher.fetch_batch(&urls, &run_config).await });

        let joined = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!("Crawl cancelled with a batch in flight");
                return BatchOutcome::Cancelled;
            }
            joined = task => joined,
        };

        match joined {
            Ok(results) => match correlate(&requested, results) {
                Ok(ordered) => BatchOutcome::Done(ordered),
                Err(e) => BatchOutcome::Fatal(e),
            },
            Err(e) => BatchOutcome::Fatal(FrontierError::FetchTask(e)),
        }
    }

    fn record(&mut self, entry: &FrontierEntry, page: &PageResult) {
        self.stats.urls_processed += 1;
        self.stats.current_depth = entry.depth;
        if !page.success {
            self.stats.urls_failed += 1;
            tracing::warn!(
                "Fetch failed for {} (status {}): {}",
                page.url,
                page.status_code,
                page.error_message.as_deref().unwrap_or("unknown error")
            );
        }
    }

    /// Admits the outbound links of one successful page
    async fn discover(&mut self, entry: &FrontierEntry, page: &PageResult) {
        let Ok(base) = Url::parse(&page.url) else {
            return;
        };

        let external = if self.config.follow_external_links {
            page.external_links.as_slice()
        } else {
            &[]
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for link in page.internal_links.iter().chain(external) {
            let normalized = match resolve_link(&base, &link.href) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::debug!("Skipping malformed link {:?} on {}: {}", link.href, page.url, e);
                    self.stats.urls_skipped += 1;
                    continue;
                }
            };
            if self.frontier.is_visited(&normalized) || !seen.insert(normalized.clone()) {
                continue;
            }
            candidates.push(normalized);
        }

        let allowed = match &self.config.robots {
            Some(robots) => join_all(candidates.iter().map(|url| robots.can_fetch(url))).await,
            None => vec![true; candidates.len()],
        };

        let new_depth = self.frontier.depth_of(&entry.url).unwrap_or(entry.depth) + 1;
        for (url, robots_ok) in candidates.into_iter().zip(allowed) {
            if !robots_ok {
                tracing::debug!("robots.txt disallows {}", url);
                self.stats.robots_blocked += 1;
                self.stats.urls_skipped += 1;
                continue;
            }
            if let Err(rejection) = self.config.filter_chain.evaluate(&url) {
                tracing::debug!("Rejected {}: {}", url, rejection);
                self.stats.urls_skipped += 1;
                continue;
            }
            if new_depth > self.config.max_depth {
                continue;
            }

            let score = self.config.scorer.as_ref().map_or(0.0, |s| s.score(&url));
            if self.frontier.push(url.clone(), new_depth, -score) {
                tracing::trace!("Queued {} at depth {} (score {:.3})", url, new_depth, score);
                self.scores.insert(url, score);
                self.stats.max_depth_reached = self.stats.max_depth_reached.max(new_depth);
            }
        }
    }

    /// Sends one result, returning `false` once the caller is gone or cancelled
    async fn emit(&self, result: CrawlResult) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(Ok(result)) => sent.is_ok(),
        }
    }

    fn set_state(&self, state: CrawlState) {
        tracing::debug!("Crawl state -> {}", state);
        self.state_tx.send_replace(state);
        self.stats_tx.send_replace(self.stats.clone());
    }
}

fn resolve_link(base: &Url, href: &str) -> Result<Url, UrlError> {
    let joined = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    normalize_url(joined.as_str())
}

/// Matches fetcher results to the requested URLs, in request order
fn correlate(requested: &[String], results: Vec<PageResult>) -> Result<Vec<PageResult>, FrontierError> {
    if results.len() != requested.len() {
        return Err(FrontierError::FetcherContract(format!(
            "requested {} URLs, got {} results",
            requested.len(),
            results.len()
        )));
    }

    let mut by_url: HashMap<String, PageResult> = HashMap::with_capacity(results.len());
    for result in results {
        if let Some(duplicate) = by_url.insert(result.url.clone(), result) {
            return Err(FrontierError::FetcherContract(format!(
                "duplicate result for {}",
                duplicate.url
            )));
        }
    }

    requested
        .iter()
        .map(|url| {
            by_url
                .remove(url)
                .ok_or_else(|| FrontierError::FetcherContract(format!("no result for {}", url)))
        })
        .collect()
}
