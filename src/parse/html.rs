//! Markup normalization: absolute URLs, page metadata, link discovery

use super::resolve::{absolutize, is_crawlable_scheme, is_skippable_reference, same_domain};
use super::tree::{DocumentTree, HtmlDocument};
use tracing::debug;
use url::Url;

pub const NO_TITLE: &str = "No title found";
pub const NO_DESCRIPTION: &str = "No description found";

/// Result of normalizing one page
#[derive(Debug, Clone)]
pub struct RewrittenPage {
    /// Serialized document with absolute resource URLs, cut to the size limit
    pub normalized_html: String,
    pub title: String,
    pub description: String,
    pub favicon_url: Option<Url>,
    /// Same-domain http(s) anchors, in document order
    pub discovered_links: Vec<Url>,
}

/// Metadata gathered while rewriting a tree
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<Url>,
    pub discovered_links: Vec<Url>,
}

/// Which attribute of a tag carries a resource reference
fn resource_attribute(tag: &str) -> Option<&'static str> {
    match tag {
        "a" | "link" => Some("href"),
        "script" | "img" => Some("src"),
        _ => None,
    }
}

/// Parse `content`, rewrite it against `base` and collect links in the domain
/// of `scope`
pub fn rewrite_html(content: &str, base: &Url, scope: &Url, max_chars: usize) -> RewrittenPage {
    let mut document = HtmlDocument::parse(content);
    let meta = rewrite_document(&mut document, base, scope);
    let serialized = document.serialize();

    RewrittenPage {
        normalized_html: truncate_chars(&serialized, max_chars).to_string(),
        title: meta.title.unwrap_or_else(|| NO_TITLE.to_string()),
        description: meta
            .description
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        favicon_url: meta.favicon_url,
        discovered_links: meta.discovered_links,
    }
}

/// Rewrite resource attributes in place and extract page metadata in a single
/// pass over the tree
pub fn rewrite_document<T: DocumentTree>(tree: &mut T, base: &Url, scope: &Url) -> PageMetadata {
    let mut meta = PageMetadata::default();
    let mut favicon_seen = false;

    for node in tree.elements() {
        let Some(tag) = tree.tag_name(node).map(str::to_string) else {
            continue;
        };

        match tag.as_str() {
            "title" if meta.title.is_none() => {
                let text = tree.text_content(node);
                let text = text.trim();
                if !text.is_empty() {
                    meta.title = Some(text.to_string());
                }
            }
            "meta" if meta.description.is_none() => {
                let is_description = tree
                    .attribute(node, "name")
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"));
                if is_description {
                    let content = tree.attribute(node, "content").unwrap_or("").trim();
                    if !content.is_empty() {
                        meta.description = Some(content.to_string());
                    }
                }
            }
            "link" if !favicon_seen => {
                let is_icon = tree
                    .attribute(node, "rel")
                    .is_some_and(|rel| rel.to_lowercase().contains("icon"));
                if is_icon {
                    favicon_seen = true;
                    meta.favicon_url = tree
                        .attribute(node, "href")
                        .and_then(|href| absolutize(base, href.trim()).ok());
                }
            }
            _ => {}
        }

        let Some(attr) = resource_attribute(&tag) else {
            continue;
        };
        let Some(reference) = tree.attribute(node, attr).map(str::to_string) else {
            continue;
        };
        if is_skippable_reference(&reference) {
            continue;
        }

        let resolved = match absolutize(base, &reference) {
            Ok(url) => url,
            Err(e) => {
                debug!("Leaving unresolvable {} on <{}>: {}", attr, tag, e);
                continue;
            }
        };
        tree.set_attribute(node, attr, resolved.to_string());

        if tag == "a" && is_crawlable_scheme(&resolved) && same_domain(&resolved, scope) {
            meta.discovered_links.push(resolved);
        }
    }

    meta
}

/// Cut `s` to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 200_000;

    fn base() -> Url {
        Url::parse("https://example.com/blog/post.html").unwrap()
    }

    #[test]
    fn test_rewrites_resource_attributes() {
        let html = r#"<html><head>
            <link rel="stylesheet" href="/css/site.css">
            <script src="js/app.js"></script>
        </head><body>
            <a href="../about">About</a>
            <img src="//cdn.example.net/logo.png">
        </body></html>"#;

        let page = rewrite_html(html, &base(), &base(), LIMIT);
        let out = &page.normalized_html;
        assert!(out.contains(r#"href="https://example.com/css/site.css""#));
        assert!(out.contains(r#"src="https://example.com/blog/js/app.js""#));
        assert!(out.contains(r#"href="https://example.com/about""#));
        assert!(out.contains(r#"src="https://cdn.example.net/logo.png""#));
    }

    #[test]
    fn test_skippable_references_untouched() {
        let html = r##"<body>
            <a href="#top">Top</a>
            <a href="mailto:x@y.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
        </body>"##;

        let page = rewrite_html(html, &base(), &base(), LIMIT);
        let out = &page.normalized_html;
        assert!(out.contains(r##"href="#top""##));
        assert!(out.contains(r#"href="mailto:x@y.com""#));
        assert!(out.contains(r#"href="javascript:void(0)""#));
        assert!(page.discovered_links.is_empty());
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let page = rewrite_html("<html><body><p>hi</p></body></html>", &base(), &base(), LIMIT);
        assert_eq!(page.title, "No title found");
        assert_eq!(page.description, "No description found");
        assert!(page.favicon_url.is_none());

        let page = rewrite_html(
            r#"<title>   </title><meta name="description" content="  ">"#,
            &base(),
            &base(),
            LIMIT,
        );
        assert_eq!(page.title, "No title found");
        assert_eq!(page.description, "No description found");
    }

    #[test]
    fn test_metadata_extraction() {
        let html = r#"<html><head>
            <title>  Hello World  </title>
            <meta name="Description" content=" A page about things ">
            <link rel="stylesheet" href="/a.css">
            <link rel="Shortcut Icon" href=" /favicon.ico ">
            <link rel="apple-touch-icon" href="/touch.png">
        </head></html>"#;

        let page = rewrite_html(html, &base(), &base(), LIMIT);
        assert_eq!(page.title, "Hello World");
        assert_eq!(page.description, "A page about things");
        assert_eq!(
            page.favicon_url.map(|u| u.to_string()),
            Some("https://example.com/favicon.ico".to_string())
        );
    }

    #[test]
    fn test_discovered_links_scoped_and_ordered() {
        let html = r#"<body>
            <a href="/b">B</a>
            <a href="https://other.org/d">D</a>
            <a href="c">C</a>
            <a href="ftp://example.com/file">FTP</a>
            <a>no href</a>
            <a href="https://example.com:8080/port">Port</a>
        </body>"#;

        let scope = Url::parse("https://example.com/").unwrap();
        let page = rewrite_html(html, &base(), &scope, LIMIT);
        let links: Vec<String> = page.discovered_links.iter().map(|u| u.to_string()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/b".to_string(),
                "https://example.com/blog/c".to_string(),
            ]
        );
        // Off-domain anchors are still made absolute, just not followed
        assert!(page.normalized_html.contains(r#"href="https://other.org/d""#));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = r##"<!DOCTYPE html><html><head><title>T</title>
            <link rel="icon" href="fav.ico"><script src="/s.js"></script></head>
            <body><a href="x/y?z=1&amp;w=2">x</a><a href="#frag">f</a>
            <img src="../i.png" alt="&lt;img&gt;"></body></html>"##;

        let once = rewrite_html(html, &base(), &base(), LIMIT);
        let twice = rewrite_html(&once.normalized_html, &base(), &base(), LIMIT);
        assert_eq!(once.normalized_html, twice.normalized_html);
        assert_eq!(once.discovered_links, twice.discovered_links);
        assert_eq!(once.favicon_url, twice.favicon_url);
    }

    #[test]
    fn test_inline_svg_sprite_preserved() {
        let html = r##"<body><svg xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#icon"></use></svg>
            <img src="i.png"></body>"##;

        let page = rewrite_html(html, &base(), &base(), LIMIT);
        let out = &page.normalized_html;
        assert!(out.contains(r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink">"#));
        assert!(out.contains(r##"<use xlink:href="#icon"></use>"##));
        assert!(out.contains(r#"src="https://example.com/blog/i.png""#));
    }

    #[test]
    fn test_output_truncated_to_limit() {
        let body = "é".repeat(500);
        let html = format!("<html><body><p>{}</p></body></html>", body);
        let page = rewrite_html(&html, &base(), &base(), 100);
        assert_eq!(page.normalized_html.chars().count(), 100);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 2), "he");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
