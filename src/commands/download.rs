//! Download command implementation

use crate::config::Config;
use crate::crawl::Crawler;
use crate::error::Result;
use crate::models::DownloadedPage;
use tracing::info;
use url::Url;

/// Fetch and normalize a single page, packaged as an HTML attachment
pub async fn cmd_download(config: &Config, url: &str) -> Result<DownloadedPage> {
    let url = Url::parse(url)?;
    info!("Download requested for: {}", url);

    let crawler = Crawler::new(config.crawl.clone())?;
    let snapshot = crawler.fetch_snapshot(&url).await?;
    Ok(DownloadedPage::new(snapshot.html))
}
