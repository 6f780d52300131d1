//! End-to-end crawl runs against an in-memory site

use async_trait::async_trait;
use crawl_frontier::crawler::{crawl, CrawlConfig, CrawlState, Link, PageFetcher, PageResult, RunConfig};
use crawl_frontier::filters::{DomainFilter, FilterChain};
use crawl_frontier::robots::{RobotsCache, RobotsSource};
use crawl_frontier::scoring::{CompositeScorer, Scorer};
use crawl_frontier::{CrawlResult, FrontierError, RobotsError};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves a fixed link graph; URLs listed in `failing` return errors
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    delay: Duration,
    fetched: Mutex<Vec<String>>,
}

impl FakeSite {
    fn new(pages: &[(&str, &[&str])]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, links)| (url.to_string(), links.iter().map(|l| l.to_string()).collect()))
                .collect(),
            ..Default::default()
        }
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str, _config: &RunConfig) -> PageResult {
        self.fetched.lock().unwrap().push(url.to_string());
        tokio::time::sleep(self.delay).await;

        if self.failing.contains(url) {
            return PageResult::failure(url, 500, "HTTP 500 Internal Server Error");
        }
        match self.pages.get(url) {
            Some(links) => {
                let (internal, external): (Vec<Link>, Vec<Link>) = links
                    .iter()
                    .map(|href| Link::new(href.clone(), ""))
                    .partition(|link| link.href.starts_with("https://s.com") || link.href.starts_with('/'));
                PageResult::success(url, 200).with_links(internal, external)
            }
            None => PageResult::failure(url, 404, "HTTP 404 Not Found"),
        }
    }
}

/// Returns no results at all
struct ShortChangingFetcher;

#[async_trait]
impl PageFetcher for ShortChangingFetcher {
    async fn fetch(&self, url: &str, _config: &RunConfig) -> PageResult {
        PageResult::success(url, 200)
    }

    async fn fetch_batch(&self, _urls: &[String], _config: &RunConfig) -> Vec<PageResult> {
        Vec::new()
    }
}

struct PanickingFetcher;

#[async_trait]
impl PageFetcher for PanickingFetcher {
    async fn fetch(&self, _url: &str, _config: &RunConfig) -> PageResult {
        panic!("fetcher exploded");
    }
}

struct StaticRobots(&'static str);

#[async_trait]
impl RobotsSource for StaticRobots {
    async fn fetch(&self, _robots_url: &str) -> Result<String, RobotsError> {
        Ok(self.0.to_string())
    }
}

const START: &str = "https://s.com/";

fn config(max_depth: u32, max_pages: u32) -> CrawlConfig {
    CrawlConfig {
        max_depth,
        max_pages,
        ..CrawlConfig::default()
    }
}

async fn run(site: Arc<FakeSite>, config: CrawlConfig) -> (Vec<CrawlResult>, crawl_frontier::CrawlStats) {
    let mut handle = crawl(START, config, site).unwrap();
    let mut results = Vec::new();
    while let Some(item) = handle.next().await {
        results.push(item.unwrap());
    }
    assert_eq!(handle.state(), CrawlState::Completed);
    (results, handle.stats())
}

fn urls(results: &[CrawlResult]) -> Vec<&str> {
    results.iter().map(|r| r.page.url.as_str()).collect()
}

#[tokio::test]
async fn test_page_bound_stops_after_max_pages() {
    let site = Arc::new(FakeSite::new(&[(
        START,
        &["https://s.com/a", "https://s.com/b", "https://s.com/c", "https://s.com/d"],
    )]));

    let (results, stats) = run(site.clone(), config(1, 3)).await;

    assert_eq!(urls(&results), vec![START, "https://s.com/a", "https://s.com/b"]);
    assert_eq!(stats.urls_processed, 3);
    assert!(!site.fetched().contains(&"https://s.com/d".to_string()));
    assert!(!site.fetched().contains(&"https://s.com/c".to_string()));
}

#[tokio::test]
async fn test_final_batch_drains_without_discovery() {
    let site = Arc::new(FakeSite::new(&[
        (START, &["https://s.com/a", "https://s.com/b", "https://s.com/c"]),
        ("https://s.com/a", &["https://s.com/a/deep"]),
        ("https://s.com/b", &["https://s.com/b/deep"]),
    ]));
    let config = CrawlConfig {
        batch_size: 2,
        filter_chain: Arc::new(FilterChain::default().with(DomainFilter::allow(["s.com"]))),
        ..config(3, 3)
    };
    let filters = config.filter_chain.clone();
    let mut handle = crawl(START, config, site.clone()).unwrap();

    // Nothing is read yet, so the controller holds the last batch back on a
    // full channel while it is draining.
    tokio::time::timeout(Duration::from_secs(5), async {
        while handle.state() != CrawlState::Draining {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("crawl never started draining");

    let mut results = Vec::new();
    while let Some(item) = handle.next().await {
        results.push(item.unwrap());
    }

    assert_eq!(urls(&results), vec![START, "https://s.com/a", "https://s.com/b"]);
    assert_eq!(handle.state(), CrawlState::Completed);
    assert_eq!(handle.stats().max_depth_reached, 1);
    assert_eq!(filters.stats().total_seen, 3);
    assert!(!site.fetched().iter().any(|url| url.ends_with("/deep")));
}

#[tokio::test]
async fn test_failed_fetch_does_not_stop_batch() {
    let site = Arc::new(
        FakeSite::new(&[
            (START, &["https://s.com/1", "https://s.com/2", "https://s.com/3"]),
            ("https://s.com/1", &["https://s.com/1/next"]),
            ("https://s.com/2", &["https://s.com/2/next"]),
            ("https://s.com/3", &["https://s.com/3/next"]),
            ("https://s.com/1/next", &[]),
            ("https://s.com/3/next", &[]),
        ])
        .failing("https://s.com/2"),
    );

    let (results, stats) = run(site, config(2, 0)).await;

    assert_eq!(
        urls(&results),
        vec![
            START,
            "https://s.com/1",
            "https://s.com/2",
            "https://s.com/3",
            "https://s.com/1/next",
            "https://s.com/3/next",
        ]
    );
    let failed: Vec<_> = results.iter().filter(|r| !r.page.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].page.url, "https://s.com/2");
    assert!(failed[0].page.error_message.is_some());
    assert_eq!(stats.urls_failed, 1);
    assert_eq!(stats.urls_processed, 6);
}

#[tokio::test]
async fn test_cycles_visit_each_url_once() {
    let site = Arc::new(FakeSite::new(&[
        (START, &["https://s.com/a", "https://s.com/b", "https://s.com/a#top"]),
        ("https://s.com/a", &["https://s.com/b", START, "/a/"]),
        ("https://s.com/b", &["https://s.com/a", "https://s.com/?", "https://S.com/b"]),
    ]));

    let (results, _) = run(site.clone(), config(5, 0)).await;

    let unique: HashSet<_> = urls(&results).into_iter().collect();
    assert_eq!(unique.len(), results.len());
    assert_eq!(results.len(), 3);
    assert_eq!(site.fetched().len(), 3);
}

#[tokio::test]
async fn test_depth_bound_and_monotonicity() {
    let site = Arc::new(FakeSite::new(&[
        (START, &["https://s.com/1"]),
        ("https://s.com/1", &["https://s.com/2"]),
        ("https://s.com/2", &["https://s.com/3"]),
        ("https://s.com/3", &["https://s.com/4"]),
    ]));

    let (results, stats) = run(site.clone(), config(2, 0)).await;

    let depths: Vec<_> = results.iter().map(|r| (r.page.url.as_str(), r.depth)).collect();
    assert_eq!(
        depths,
        vec![(START, 0), ("https://s.com/1", 1), ("https://s.com/2", 2)]
    );
    assert_eq!(stats.max_depth_reached, 2);
    assert!(!site.fetched().contains(&"https://s.com/3".to_string()));

    for (i, result) in results.iter().enumerate().filter(|(_, r)| r.depth > 0) {
        assert!(results[..i].iter().any(|earlier| earlier.depth == result.depth - 1));
    }
}

#[tokio::test]
async fn test_higher_score_fetched_first() {
    let site = Arc::new(FakeSite::new(&[(
        START,
        &["https://s.com/misc", "https://s.com/other", "https://s.com/rust-guide"],
    )]));
    let scorer = CompositeScorer::new(vec![Scorer::keyword(["rust"], false, 1.0).unwrap()]);

    let config = CrawlConfig {
        batch_size: 1,
        scorer: Some(Arc::new(scorer)),
        ..config(1, 0)
    };
    let (results, _) = run(site, config).await;

    assert_eq!(
        urls(&results),
        vec![START, "https://s.com/rust-guide", "https://s.com/misc", "https://s.com/other"]
    );
    assert_eq!(results[1].score, 1.0);
    assert_eq!(results[2].score, 0.0);
}

#[tokio::test]
async fn test_freshness_orders_dated_links() {
    let site = Arc::new(FakeSite::new(&[(
        START,
        &["https://s.com/about", "https://s.com/news/2020/", "https://s.com/news/2024/"],
    )]));
    let scorer = CompositeScorer::new(vec![Scorer::freshness(2024, 1.0).unwrap()]);

    let config = CrawlConfig {
        batch_size: 1,
        scorer: Some(Arc::new(scorer)),
        ..config(1, 0)
    };
    let (results, _) = run(site, config).await;

    assert_eq!(
        urls(&results),
        vec![START, "https://s.com/news/2024", "https://s.com/news/2020", "https://s.com/about"]
    );
    let scores: Vec<f64> = results[1..].iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![1.0, 0.6, 0.5]);
}

#[tokio::test]
async fn test_external_links_need_opt_in() {
    let pages: &[(&str, &[&str])] = &[(START, &["https://s.com/in", "https://elsewhere.org/out"])];

    let (results, _) = run(Arc::new(FakeSite::new(pages)), config(1, 0)).await;
    assert!(!urls(&results).contains(&"https://elsewhere.org/out"));

    let follow = CrawlConfig {
        follow_external_links: true,
        ..config(1, 0)
    };
    let (results, _) = run(Arc::new(FakeSite::new(pages)), follow).await;
    assert!(urls(&results).contains(&"https://elsewhere.org/out"));
}

#[tokio::test]
async fn test_filter_rejections_counted() {
    let site = Arc::new(FakeSite::new(&[(
        START,
        &["https://s.com/ok", "https://blocked.net/x", "https://blocked.net/y"],
    )]));
    let chain = FilterChain::default().with(DomainFilter::allow(["s.com"]));

    let config = CrawlConfig {
        follow_external_links: true,
        filter_chain: Arc::new(chain),
        ..config(1, 0)
    };
    let filters = config.filter_chain.clone();
    let (results, stats) = run(site, config).await;

    assert_eq!(urls(&results), vec![START, "https://s.com/ok"]);
    assert_eq!(stats.urls_skipped, 2);
    assert_eq!(stats.robots_blocked, 0);
    assert_eq!(filters.stats().rejected, 2);
}

#[tokio::test]
async fn test_robots_disallowed_links_skipped() {
    let site = Arc::new(FakeSite::new(&[(
        START,
        &["https://s.com/public", "https://s.com/private/a", "https://s.com/private/b"],
    )]));
    let robots = RobotsCache::new(
        Arc::new(StaticRobots("User-agent: *\nDisallow: /private")),
        "FrontierBot",
    );

    let config = CrawlConfig {
        robots: Some(Arc::new(robots)),
        ..config(1, 0)
    };
    let robots = config.robots.clone().unwrap();
    let (results, stats) = run(site, config).await;

    assert_eq!(urls(&results), vec![START, "https://s.com/public"]);
    assert_eq!(stats.robots_blocked, 2);
    assert_eq!(stats.urls_skipped, 2);
    assert_eq!(robots.fetch_count(), 1);
}

#[tokio::test]
async fn test_cancel_stops_stream() {
    let site = Arc::new(
        FakeSite::new(&[(START, &["https://s.com/a", "https://s.com/b", "https://s.com/c"])])
            .slow(Duration::from_millis(300)),
    );

    let mut handle = crawl(START, config(3, 0), site).unwrap();
    let first = handle.next().await.unwrap().unwrap();
    assert_eq!(first.page.url, START);

    handle.cancel();
    let mut rest = 0;
    while let Some(item) = handle.next().await {
        item.unwrap();
        rest += 1;
    }

    assert_eq!(rest, 0);
    assert_eq!(handle.state(), CrawlState::Cancelled);
}

#[tokio::test]
async fn test_wrong_result_count_is_fatal() {
    let mut handle = crawl(START, config(1, 0), Arc::new(ShortChangingFetcher)).unwrap();

    let item = handle.next().await.unwrap();
    assert!(matches!(item, Err(FrontierError::FetcherContract(_))));
    assert!(handle.next().await.is_none());
    assert_eq!(handle.state(), CrawlState::Cancelled);
}

#[tokio::test]
async fn test_fetcher_panic_is_fatal() {
    let mut handle = crawl(START, config(1, 0), Arc::new(PanickingFetcher)).unwrap();

    let item = handle.next().await.unwrap();
    assert!(matches!(item, Err(FrontierError::FetchTask(_))));
    assert!(handle.next().await.is_none());
}

#[tokio::test]
async fn test_invalid_start_url_rejected() {
    let result = crawl("ftp://s.com/", config(1, 0), Arc::new(FakeSite::default()));
    assert!(matches!(result, Err(FrontierError::UrlError(_))));
}
