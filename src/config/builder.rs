//! Turns a parsed [`Config`] into the runtime objects a crawl uses

use crate::config::types::{Config, FilterEntry, ScorerConfig, ScorerEntry};
use crate::crawler::{build_http_client, CrawlConfig, RunConfig};
use crate::filters::{ContentTypeFilter, DomainFilter, Filter, FilterChain, UrlPatternFilter};
use crate::robots::{HttpRobotsSource, RobotsCache};
use crate::scoring::{CompositeScorer, FreshnessScorer, Scorer, ScorerKind};
use crate::{ConfigError, FrontierError};
use std::sync::Arc;
use std::time::Duration;

impl Config {
    /// Builds the admission filter chain, in file order
    pub fn build_filter_chain(&self) -> Result<FilterChain, ConfigError> {
        let filters = self
            .filters
            .iter()
            .map(build_filter)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FilterChain::new(filters))
    }

    /// Builds the composite scorer, or `None` when no `[scorer]` section exists
    pub fn build_scorer(&self) -> Result<Option<CompositeScorer>, ConfigError> {
        self.scorer.as_ref().map(build_composite).transpose()
    }

    /// Builds everything a crawl run needs except the page fetcher
    ///
    /// When robots.txt is respected a fresh cache is created, so each call
    /// starts with no cached robots entries.
    pub fn crawl_config(&self) -> Result<CrawlConfig, FrontierError> {
        let robots = if self.crawl.respect_robots {
            let source = HttpRobotsSource::new(build_http_client(&self.user_agent)?);
            let cache = RobotsCache::new(Arc::new(source), self.user_agent.crawler_name.clone())
                .with_timeout(Duration::from_secs(self.crawl.robots_timeout));
            Some(Arc::new(cache))
        } else {
            None
        };

        Ok(CrawlConfig {
            max_depth: self.crawl.max_depth,
            max_pages: self.crawl.max_pages,
            batch_size: self.crawl.batch_size,
            follow_external_links: self.crawl.follow_external_links,
            filter_chain: Arc::new(self.build_filter_chain()?),
            scorer: self.build_scorer()?.map(Arc::new),
            robots,
            run_config: RunConfig {
                timeout: self.crawl.fetch_timeout.map(Duration::from_secs),
            },
        })
    }
}

fn build_filter(entry: &FilterEntry) -> Result<Filter, ConfigError> {
    let filter = match entry {
        FilterEntry::Domain { allowed, blocked } => {
            Filter::from(DomainFilter::new(allowed.clone(), blocked.clone()))
        }
        FilterEntry::ContentType { allowed_types } => {
            Filter::from(ContentTypeFilter::new(allowed_types.clone()))
        }
        FilterEntry::UrlPattern {
            patterns,
            reverse,
            cache_size,
        } => Filter::from(UrlPatternFilter::new(patterns.clone(), *reverse)?.with_cache_capacity(*cache_size)),
    };
    Ok(filter)
}

fn build_composite(config: &ScorerConfig) -> Result<CompositeScorer, ConfigError> {
    let scorers = config
        .components
        .iter()
        .map(build_scorer)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompositeScorer::with_normalize(scorers, config.normalize))
}

fn build_scorer(entry: &ScorerEntry) -> Result<Scorer, ConfigError> {
    match entry {
        ScorerEntry::Keyword {
            keywords,
            case_sensitive,
            weight,
        } => Scorer::keyword(keywords, *case_sensitive, *weight),
        ScorerEntry::PathDepth {
            optimal_depth,
            weight,
        } => Scorer::path_depth(*optimal_depth, *weight),
        ScorerEntry::Freshness {
            current_year,
            weight,
        } => {
            let scorer = current_year.map_or_else(FreshnessScorer::this_year, FreshnessScorer::new);
            Scorer::new(ScorerKind::Freshness(scorer), *weight)
        }
        ScorerEntry::ContentType {
            type_weights,
            weight,
        } => Scorer::content_type(
            type_weights.iter().map(|t| (t.pattern.as_str(), t.weight)),
            *weight,
        ),
        ScorerEntry::DomainAuthority {
            domain_weights,
            default_weight,
            weight,
        } => Scorer::domain_authority(
            domain_weights.iter().map(|d| (d.domain.as_str(), d.weight)),
            *default_weight,
            *weight,
        ),
    }
}
