use chrono::Datelike;
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

/// Raw score when the URL carries no recognizable date
pub const UNKNOWN_FRESHNESS: f64 = 0.5;

const YEAR_CACHE_CAPACITY: usize = 10_000;

/// Scores URLs by the most recent year embedded in them
///
/// Recognized forms are `/YYYY/MM/DD/`, `YYYY-MM-DD`, `YYYY_MM_DD` and a bare
/// `/YYYY/` segment (also at the end of the path), for years 1900-2099. The current year scores `1.0`, each
/// year older loses `0.1`, floored at `0.1`. Years in the future score `1.0`.
/// A URL without any date scores [`UNKNOWN_FRESHNESS`], which means "unknown",
/// not "half fresh".
#[derive(Debug)]
pub struct FreshnessScorer {
    current_year: i32,
    years: Mutex<LruCache<String, Option<i32>>>,
}

impl FreshnessScorer {
    pub fn new(current_year: i32) -> Self {
        let capacity = NonZeroUsize::new(YEAR_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            current_year,
            years: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Uses the current UTC year
    pub fn this_year() -> Self {
        Self::new(chrono::Utc::now().year())
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn raw(&self, url: &str) -> f64 {
        match self.cached_year(url) {
            None => UNKNOWN_FRESHNESS,
            Some(year) => {
                let age = self.current_year - year;
                if age <= 0 {
                    1.0
                } else {
                    f64::from((10 - age).max(1)) / 10.0
                }
            }
        }
    }

    fn cached_year(&self, url: &str) -> Option<i32> {
        if let Ok(mut cache) = self.years.lock() {
            if let Some(year) = cache.get(url) {
                return *year;
            }
        }
        let year = latest_year(url);
        if let Ok(mut cache) = self.years.lock() {
            cache.put(url.to_string(), year);
        }
        year
    }
}

impl Clone for FreshnessScorer {
    fn clone(&self) -> Self {
        Self::new(self.current_year)
    }
}

// Group `year` is the four-digit year. A bare `/YYYY` segment counts when it
// ends the path or is followed by another segment, so `/YYYY/MM/DD/` needs no
// branch of its own.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
          /(?P<year>(?:19|20)[0-9]{2})(?:[/?\#]|$)
        | (?:^|[^0-9])(?P<dashed>(?:19|20)[0-9]{2})-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])(?:[^0-9]|$)
        | (?:^|[^0-9])(?P<underscored>(?:19|20)[0-9]{2})_(?:0[1-9]|1[0-2])_(?:0[1-9]|[12][0-9]|3[01])(?:[^0-9]|$)
        ",
    )
    .expect("date pattern compiles")
});

/// Finds the most recent year in any recognized date form
pub fn latest_year(url: &str) -> Option<i32> {
    let mut latest: Option<i32> = None;
    let mut at = 0;

    // Matches overlap on separators (`/2019/2020/`), so each search resumes
    // right after the previous year rather than after the whole match.
    while let Some(caps) = DATE_PATTERN.captures_at(url, at) {
        let Some(year) = ["year", "dashed", "underscored"]
            .iter()
            .find_map(|name| caps.name(name))
        else {
            break;
        };
        if let Ok(value) = year.as_str().parse::<i32>() {
            latest = Some(latest.map_or(value, |y| y.max(value)));
        }
        at = year.end();
    }

    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_scores() {
        let scorer = FreshnessScorer::new(2024);
        assert_eq!(scorer.raw("https://news.com/2024/story"), 1.0);
        assert_eq!(scorer.raw("https://news.com/2020/story"), 0.6);
        assert_eq!(scorer.raw("https://news.com/story"), 0.5);
    }

    #[test]
    fn test_floor_and_future() {
        let scorer = FreshnessScorer::new(2024);
        assert_eq!(scorer.raw("https://news.com/1999/old/"), 0.1);
        assert_eq!(scorer.raw("https://news.com/2030/plans/"), 1.0);
    }

    #[test]
    fn test_date_forms() {
        assert_eq!(latest_year("https://x.com/2023/04/01/post"), Some(2023));
        assert_eq!(latest_year("https://x.com/post-2022-11-30"), Some(2022));
        assert_eq!(latest_year("https://x.com/post_2021_01_15.html"), Some(2021));
        assert_eq!(latest_year("https://x.com/archive/2019/"), Some(2019));
    }

    #[test]
    fn test_year_ending_the_path() {
        assert_eq!(latest_year("https://x.com/news/2024"), Some(2024));
        assert_eq!(latest_year("https://x.com/news/2023?page=2"), Some(2023));
        assert_eq!(latest_year("https://x.com/news/2022#top"), Some(2022));
        assert_eq!(latest_year("https://x.com/news/2024x"), None);

        // What the crawl scores once `/news/2024/` is normalized
        let scorer = FreshnessScorer::new(2024);
        let normalized = crate::url::normalize_url("https://x.com/news/2024/").unwrap();
        assert_eq!(scorer.raw(normalized.as_str()), 1.0);
    }

    #[test]
    fn test_most_recent_year_wins() {
        assert_eq!(latest_year("https://x.com/2018/review-of-2021-03-02/"), Some(2021));
        assert_eq!(latest_year("https://x.com/2019/2020/"), Some(2020));
    }

    #[test]
    fn test_non_dates_ignored() {
        assert_eq!(latest_year("https://x.com/product/12345/"), None);
        assert_eq!(latest_year("https://x.com/v2024x/"), None);
        assert_eq!(latest_year("https://x.com/1234/"), None);
        assert_eq!(latest_year("https://x.com/2022-13-01"), None);
        assert_eq!(latest_year("https://x.com/2022-01_01"), None);
    }

    #[test]
    fn test_cached_lookup_is_stable() {
        let scorer = FreshnessScorer::new(2024);
        let url = "https://x.com/2022/01/05/post";
        let first = scorer.raw(url);
        assert_eq!(scorer.raw(url), first);
        assert_eq!(first, 0.8);
    }
}
