//! Request-scoped values produced by crawls, clones and downloads.

use serde::{Deserialize, Serialize};
use url::Url;

pub const DOWNLOAD_FILENAME: &str = "cloned_page.html";
pub const DOWNLOAD_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// One fetched and normalized page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(rename = "url")]
    pub source_url: Url,
    pub html: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "favicon")]
    pub favicon_url: Option<Url>,
}

/// Pages of one crawl, in the order they were fetched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub pages: Vec<PageSnapshot>,
}

/// Rendered DOM handed to the generation stage
#[derive(Debug, Clone)]
pub struct DesignContext {
    pub source_url: Url,
    pub rendered_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneResult {
    #[serde(rename = "url")]
    pub source_url: Url,
    pub generated_html: String,
}

/// A single normalized page packaged as a file attachment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedPage {
    pub html: String,
    pub filename: &'static str,
    pub content_type: &'static str,
}

impl DownloadedPage {
    pub fn new(html: String) -> Self {
        Self {
            html,
            filename: DOWNLOAD_FILENAME,
            content_type: DOWNLOAD_CONTENT_TYPE,
        }
    }

    /// Value for a `Content-Disposition` header
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}
