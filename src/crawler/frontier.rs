//! Priority frontier of discovered-but-unfetched URLs
//!
//! The frontier owns the priority queue together with the visited set and the
//! depth map. It is mutated only from the crawl controller's task, so none of
//! it is synchronized.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A URL waiting in the frontier
///
/// Lower `score` is higher priority. Ties go to the shallower entry, then to
/// the one inserted first.
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub score: f64,
    pub depth: u32,
    pub url: String,
    pub insertion_seq: u64,
}

// BinaryHeap is a max-heap, so every comparison is reversed: the entry that
// should be popped first compares greatest.
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.depth.cmp(&self.depth))
            .then_with(|| other.insertion_seq.cmp(&self.insertion_seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Frontier queue plus the per-run visited set and depth map
#[derive(Debug, Default)]
pub struct Frontier {
    queue: BinaryHeap<FrontierEntry>,
    visited: HashSet<String>,
    depths: HashMap<String, u32>,
    fetched: HashSet<String>,
    next_seq: u64,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a URL into the frontier
    ///
    /// The URL is marked visited and its depth recorded immediately, so a
    /// second discovery of the same URL is refused. Returns `false` if the URL
    /// had already been admitted.
    pub fn push(&mut self, url: String, depth: u32, score: f64) -> bool {
        if !self.visited.insert(url.clone()) {
            return false;
        }
        self.depths.insert(url.clone(), depth);

        // -0.0 and 0.0 must tie under total_cmp
        let score = if score == 0.0 { 0.0 } else { score };
        let entry = FrontierEntry {
            score,
            depth,
            url,
            insertion_seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.push(entry);
        true
    }

    /// Pops up to `max` entries for one fetch batch
    ///
    /// Entries that were already handed out are skipped without counting
    /// toward `max`. Every returned entry is marked fetched.
    pub fn pop_batch(&mut self, max: usize) -> Vec<FrontierEntry> {
        let mut batch = Vec::with_capacity(max.min(self.queue.len()));
        while batch.len() < max {
            let Some(entry) = self.queue.pop() else {
                break;
            };
            if !self.fetched.insert(entry.url.clone()) {
                tracing::trace!("Skipping already fetched {}", entry.url);
                continue;
            }
            batch.push(entry);
        }
        batch
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn depth_of(&self, url: &str) -> Option<u32> {
        self.depths.get(url).copied()
    }

    /// Number of URLs still queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs ever admitted this run
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Drops every queued entry, keeping the visited set and depth map
    pub fn discard_queued(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}
