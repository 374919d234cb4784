//! Headless browser rendering for JavaScript-heavy pages
//!
//! Uses Chrome DevTools Protocol via chromiumoxide. Every render launches its
//! own browser and tears it down before returning, so nothing is shared
//! between requests.

use super::fetcher::{PageFetcher, RawPage};
use crate::config::RenderConfig;
use crate::error::Result;
use async_trait::async_trait;
use url::Url;

#[cfg(any(feature = "js-rendering", test))]
use crate::error::Error;
#[cfg(any(feature = "js-rendering", test))]
use std::{fmt::Display, future::Future};
#[cfg(any(feature = "js-rendering", test))]
use tokio::time::Instant;

/// Configuration for the headless browser renderer
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Time to wait for navigation to finish (milliseconds)
    pub page_load_timeout_ms: u64,
    /// Quiet period after load so late requests can land (milliseconds)
    pub settle_ms: u64,
    /// Run browser in headless mode
    pub headless: bool,
    /// Enable sandbox (disable for Docker/CI environments)
    pub sandbox: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RendererConfig {
    fn from(config: &RenderConfig) -> Self {
        Self {
            page_load_timeout_ms: config.page_load_timeout_ms,
            settle_ms: config.settle_ms,
            headless: config.headless,
            sandbox: config.sandbox,
        }
    }
}

/// Run one navigation step against the page load deadline
#[cfg(any(feature = "js-rendering", test))]
async fn within_deadline<T, E, F>(deadline: Instant, url: &Url, step: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout_at(deadline, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Error::Navigation(format!("{}: {}", url, e))),
        Err(_) => Err(Error::RenderTimeout(format!("Page load timeout: {}", url))),
    }
}

#[cfg(feature = "js-rendering")]
mod browser_impl {
    use super::*;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use std::time::Duration;
    use tracing::{debug, info, warn};

    /// Fetcher that returns the DOM after scripts have run
    pub struct RenderedFetcher {
        config: RendererConfig,
    }

    impl RenderedFetcher {
        pub fn new(config: RendererConfig) -> Self {
            Self { config }
        }

        async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>)> {
            let mut builder = BrowserConfig::builder();

            // chromiumoxide defaults to headless; with_head() opens a window
            if !self.config.headless {
                builder = builder.with_head();
            }

            if !self.config.sandbox {
                builder = builder.no_sandbox();
            }

            builder = builder
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg("--no-first-run")
                .arg("--disable-extensions");

            let browser_config = builder
                .build()
                .map_err(|e| Error::Navigation(format!("Failed to build browser config: {}", e)))?;

            let (browser, mut handler) = Browser::launch(browser_config)
                .await
                .map_err(|e| Error::Navigation(format!("Failed to launch browser: {}", e)))?;

            let handle = tokio::spawn(async move {
                while let Some(result) = handler.next().await {
                    if result.is_err() {
                        break;
                    }
                }
            });

            Ok((browser, handle))
        }

        async fn capture(&self, page: &Page, url: &Url, deadline: Instant) -> Result<RawPage> {
            within_deadline(deadline, url, page.wait_for_navigation()).await?;

            if self.config.settle_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
            }

            let final_url = page
                .url()
                .await
                .ok()
                .flatten()
                .and_then(|u| Url::parse(&u).ok())
                .unwrap_or_else(|| url.clone());

            let html = page
                .content()
                .await
                .map_err(|e| Error::Navigation(format!("Failed to get content: {}", e)))?;

            Ok(RawPage {
                url: final_url,
                html,
            })
        }

        /// Render a page, always releasing the browser afterwards
        pub async fn render(&self, url: &Url) -> Result<RawPage> {
            let start = Instant::now();
            info!("Rendering with headless browser: {}", url);

            let (mut browser, handle) = self.launch().await?;

            // Opening the page navigates, so it shares the load deadline
            let deadline = Instant::now() + Duration::from_millis(self.config.page_load_timeout_ms);
            let result = match within_deadline(deadline, url, browser.new_page(url.as_str())).await
            {
                Ok(page) => {
                    let captured = self.capture(&page, url, deadline).await;
                    if let Err(e) = page.close().await {
                        warn!("Failed to close page: {}", e);
                    }
                    captured
                }
                Err(e) => Err(e),
            };

            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            let _ = browser.wait().await;
            handle.abort();

            if let Ok(page) = &result {
                debug!(
                    "Rendered {} in {}ms ({} bytes)",
                    url,
                    start.elapsed().as_millis(),
                    page.html.len()
                );
            }
            result
        }
    }
}

#[cfg(feature = "js-rendering")]
pub use browser_impl::RenderedFetcher;

/// Stub renderer when js-rendering feature is disabled
#[cfg(not(feature = "js-rendering"))]
pub struct RenderedFetcher {
    _config: RendererConfig,
}

#[cfg(not(feature = "js-rendering"))]
impl RenderedFetcher {
    pub fn new(config: RendererConfig) -> Self {
        Self { _config: config }
    }

    pub async fn render(&self, url: &Url) -> Result<RawPage> {
        Err(crate::error::Error::Navigation(format!(
            "JavaScript rendering not available for {}. \
             Compile with --features js-rendering to enable headless browser support.",
            url
        )))
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawPage> {
        self.render(url).await
    }
}
