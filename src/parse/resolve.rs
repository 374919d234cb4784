//! URL resolution and same-domain scoping

use crate::error::{Error, Result};
use url::Url;

/// Resolve a possibly-relative reference against a base URL
pub fn absolutize(base: &Url, reference: &str) -> Result<Url> {
    base.join(reference)
        .map_err(|e| Error::MalformedUrl(format!("{} (relative to {}): {}", reference, base, e)))
}

/// Whether two URLs share a network location (host and explicit port).
///
/// Schemes are ignored. The url crate already lowercases hosts and drops
/// default ports, so `https://Example.com:443/` matches `http://example.com/`.
pub fn same_domain(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

/// References that are never rewritten or followed: in-page fragments,
/// `javascript:` and `mailto:` links
pub fn is_skippable_reference(reference: &str) -> bool {
    let trimmed = reference.trim_start();
    if trimmed.starts_with('#') {
        return true;
    }

    let lower = trimmed.to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("mailto:")
}

/// Only http(s) pages are fetched
pub fn is_crawlable_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Key used for visited/enqueued membership: the URL without its fragment
pub fn frontier_key(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.to_string()
}
