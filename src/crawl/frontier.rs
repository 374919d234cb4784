//! Breadth-first crawl frontier

use crate::parse::frontier_key;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Queue of URLs still to fetch plus the URLs already seen.
///
/// Owned by a single crawl and passed by reference to each step.
#[derive(Debug, Default)]
pub struct CrawlFrontier {
    queue: VecDeque<Url>,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
}

impl CrawlFrontier {
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(seed);
        frontier
    }

    /// Push a URL unless it was queued or visited before. Returns whether it
    /// was added.
    pub fn enqueue(&mut self, url: Url) -> bool {
        let key = frontier_key(&url);
        if self.visited.contains(&key) || !self.enqueued.insert(key) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Pop the next URL that has not been visited yet and mark it visited
    pub fn next_unvisited(&mut self) -> Option<Url> {
        while let Some(url) = self.queue.pop_front() {
            if self.visited.insert(frontier_key(&url)) {
                return Some(url);
            }
        }
        None
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
