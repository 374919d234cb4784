//! Bounded same-domain crawling
//!
//! This module provides:
//! - Static and browser-rendered page fetchers behind one trait
//! - An explicit breadth-first frontier with deduplication
//! - A hard page cap; the crawl otherwise runs until the frontier is empty

mod fetcher;
mod frontier;
mod renderer;

pub use fetcher::*;
pub use frontier::*;
pub use renderer::*;

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use crate::models::{CrawlResult, PageSnapshot};
use crate::parse::{is_crawlable_scheme, rewrite_html};
use tracing::{debug, error, info, warn};
use url::Url;

/// Crawler for one site at a time
pub struct Crawler {
    fetcher: Box<dyn PageFetcher>,
    config: CrawlConfig,
}

/// A page fetched and normalized, with the links it contributes to the frontier
struct FetchedPage {
    snapshot: PageSnapshot,
    links: Vec<Url>,
}

impl Crawler {
    /// Create a crawler that fetches pages over plain HTTP
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let fetcher = StaticFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    pub fn with_fetcher(config: CrawlConfig, fetcher: Box<dyn PageFetcher>) -> Self {
        Self { fetcher, config }
    }

    /// Fetch and normalize a single page with no crawling
    pub async fn fetch_snapshot(&self, url: &Url) -> Result<PageSnapshot> {
        Ok(self.fetch_page(url, url).await?.snapshot)
    }

    async fn fetch_page(&self, url: &Url, scope: &Url) -> Result<FetchedPage> {
        let raw = self.fetcher.fetch(url).await?;
        let rewritten = rewrite_html(&raw.html, &raw.url, scope, self.config.max_html_chars);

        Ok(FetchedPage {
            snapshot: PageSnapshot {
                source_url: url.clone(),
                html: rewritten.normalized_html,
                title: rewritten.title,
                description: rewritten.description,
                favicon_url: rewritten.favicon_url,
            },
            links: rewritten.discovered_links,
        })
    }

    /// Take the next unvisited URL from the frontier, fetch it and queue the
    /// links it discovers. Returns `None` once the frontier is exhausted.
    async fn step(
        &self,
        frontier: &mut CrawlFrontier,
        scope: &Url,
    ) -> Option<(Url, Result<PageSnapshot>)> {
        let url = frontier.next_unvisited()?;

        let outcome = match self.fetch_page(&url, scope).await {
            Ok(page) => {
                let mut queued = 0usize;
                for link in page.links {
                    if frontier.enqueue(link) {
                        queued += 1;
                    }
                }
                debug!("{} queued {} new links", url, queued);
                Ok(page.snapshot)
            }
            Err(e) => Err(e),
        };

        Some((url, outcome))
    }

    /// Crawl breadth-first from a seed URL.
    ///
    /// A failure fetching the seed itself is returned as the crawl's error.
    /// Later pages that fail with a page-local error are skipped.
    pub async fn crawl(&self, start_url: &str) -> Result<CrawlResult> {
        let seed = Url::parse(start_url)?;
        if !is_crawlable_scheme(&seed) {
            return Err(Error::MalformedUrl(format!(
                "Only http and https URLs can be crawled: {}",
                start_url
            )));
        }

        let max_pages = self.config.max_pages.max(1) as usize;
        let mut frontier = CrawlFrontier::new(seed.clone());
        let mut result = CrawlResult::default();
        let mut is_seed = true;

        info!("Crawling {} (max {} pages)", seed, max_pages);

        while result.pages.len() < max_pages {
            let Some((url, outcome)) = self.step(&mut frontier, &seed).await else {
                break;
            };
            let seed_step = is_seed;
            is_seed = false;

            match outcome {
                Ok(page) => result.pages.push(page),
                Err(e) if seed_step => {
                    warn!("Seed {} failed: {}", url, e);
                    return Err(e);
                }
                Err(e) if e.is_page_local() => {
                    warn!("Failed to fetch {}: {}", url, e);
                }
                Err(e) => {
                    error!("Aborting crawl of {} at {}: {}", seed, url, e);
                    return Err(e);
                }
            }
        }

        info!(
            "Crawled {} pages from {} ({} fetched, {} still queued)",
            result.pages.len(),
            seed,
            frontier.visited_count(),
            frontier.pending()
        );
        Ok(result)
    }
}
