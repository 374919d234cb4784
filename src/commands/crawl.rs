//! Crawl command implementation

use crate::config::Config;
use crate::crawl::Crawler;
use crate::error::Result;
use crate::models::CrawlResult;
use tracing::info;

/// Crawl a site from `start_url` and return its normalized pages
pub async fn cmd_crawl(config: &Config, start_url: &str) -> Result<CrawlResult> {
    info!("Received URL to crawl: {}", start_url);
    let crawler = Crawler::new(config.crawl.clone())?;
    crawler.crawl(start_url).await
}

/// Print a crawl summary to console
pub fn print_crawl_result(result: &CrawlResult) {
    println!("\n🕸  Crawled {} pages\n", result.pages.len());

    for (i, page) in result.pages.iter().enumerate() {
        println!("{}. {}", i + 1, page.title);
        println!("   URL: {}", page.source_url);
        println!("   Description: {}", page.description);
        if let Some(favicon) = &page.favicon_url {
            println!("   Favicon: {}", favicon);
        }
        println!("   HTML: {} chars", page.html.chars().count());
    }
}
