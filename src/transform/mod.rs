//! Render-then-generate clone pipeline
//!
//! A clone request renders the page in a headless browser and hands the
//! resulting DOM to a text model, which writes a fresh HTML document in the
//! same layout. Either stage failing fails the whole request.

use crate::crawl::PageFetcher;
use crate::error::{Error, Result};
use crate::generate::TextGenerator;
use crate::models::{CloneResult, DesignContext};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{info, warn};
use url::Url;

/// Fixed instruction sent with every clone request
pub const CLONE_INSTRUCTION: &str = "You are a front-end engineer. Given the rendered HTML of a web page, \
produce a single self-contained semantic HTML document that reproduces its layout, \
visual style, colors and typography as closely as possible. Inline all CSS in a <style> \
element. Keep absolute URLs for images and other assets. Return only the HTML markup, \
with no explanations and no Markdown.";

/// Sampling settings for the generation stage
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

pub struct ClonePipeline {
    renderer: Box<dyn PageFetcher>,
    generator: Box<dyn TextGenerator>,
    params: GenerationParams,
}

impl ClonePipeline {
    pub fn new(
        renderer: Box<dyn PageFetcher>,
        generator: Box<dyn TextGenerator>,
        params: GenerationParams,
    ) -> Self {
        Self {
            renderer,
            generator,
            params,
        }
    }

    /// Render stage: no fallback to a static fetch
    pub async fn render(&self, url: &Url) -> Result<DesignContext> {
        let page = self.renderer.fetch(url).await?;
        Ok(DesignContext {
            source_url: url.clone(),
            rendered_html: page.html,
        })
    }

    /// Generate stage
    pub async fn generate(&self, context: DesignContext) -> Result<CloneResult> {
        if context.rendered_html.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        info!(
            "Generating clone of {} with {} ({} bytes of input)",
            context.source_url,
            self.generator.model_name(),
            context.rendered_html.len()
        );

        let reply = self
            .generator
            .complete(
                CLONE_INSTRUCTION,
                &context.rendered_html,
                self.params.max_output_tokens,
                self.params.temperature,
            )
            .await
            .map_err(|e| match e {
                Error::Generation(_) => e,
                other => Error::Generation(other.to_string()),
            })?;

        let generated_html = strip_code_fence(&reply).to_string();
        if generated_html.is_empty() {
            return Err(Error::Generation("Model returned no markup".to_string()));
        }

        Ok(CloneResult {
            source_url: context.source_url,
            generated_html,
        })
    }

    pub async fn run(&self, url: &Url) -> Result<CloneResult> {
        let context = self.render(url).await.inspect_err(|e| {
            warn!("Render stage failed for {}: {}", url, e);
        })?;
        self.generate(context).await.inspect_err(|e| {
            warn!("Generate stage failed for {}: {}", url, e);
        })
    }
}

/// Remove a Markdown code fence wrapped around the whole reply, if any
pub fn strip_code_fence(text: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```$").ok());

    let trimmed = text.trim();
    fence
        .as_ref()
        .and_then(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::RawPage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubRenderer {
        result: fn(&Url) -> Result<RawPage>,
    }

    #[async_trait]
    impl PageFetcher for StubRenderer {
        async fn fetch(&self, url: &Url) -> Result<RawPage> {
            (self.result)(url)
        }
    }

    struct RecordingGenerator {
        calls: Arc<AtomicUsize>,
        reply: Result<String>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn complete(
            &self,
            system: &str,
            prompt: &str,
            _max_output_tokens: u32,
            _temperature: f32,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(system, CLONE_INSTRUCTION);
            assert!(!prompt.is_empty());
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(Error::Generation(e.to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    const PARAMS: GenerationParams = GenerationParams {
        max_output_tokens: 512,
        temperature: 0.2,
    };

    fn pipeline(
        result: fn(&Url) -> Result<RawPage>,
        reply: Result<String>,
    ) -> (ClonePipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = RecordingGenerator {
            calls: calls.clone(),
            reply,
        };
        let pipeline = ClonePipeline::new(
            Box::new(StubRenderer { result }),
            Box::new(generator),
            PARAMS,
        );
        (pipeline, calls)
    }

    fn rendered(url: &Url) -> Result<RawPage> {
        Ok(RawPage {
            url: url.clone(),
            html: "<html><body><h1>Hi</h1></body></html>".to_string(),
        })
    }

    fn url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[tokio::test]
    async fn test_render_failure_skips_generation() {
        let (pipeline, calls) = pipeline(
            |u| Err(Error::RenderTimeout(u.to_string())),
            Ok("<p>never</p>".to_string()),
        );

        let err = pipeline.run(&url()).await.unwrap_err();
        assert!(matches!(err, Error::RenderTimeout(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_render_is_rejected_locally() {
        let (pipeline, calls) = pipeline(
            |u| {
                Ok(RawPage {
                    url: u.clone(),
                    html: "  \n ".to_string(),
                })
            },
            Ok("<p>never</p>".to_string()),
        );

        let err = pipeline.run(&url()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_clone() {
        let (pipeline, calls) = pipeline(
            rendered,
            Ok("```html\n<!DOCTYPE html><html><body><h1>Hi</h1></body></html>\n```".to_string()),
        );

        let result = pipeline.run(&url()).await.unwrap();
        assert_eq!(result.source_url, url());
        assert_eq!(
            result.generated_html,
            "<!DOCTYPE html><html><body><h1>Hi</h1></body></html>"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_aborts() {
        let (pipeline, calls) = pipeline(
            rendered,
            Err(Error::Generation("upstream 503".to_string())),
        );

        let err = pipeline.run(&url()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_generation_error() {
        let (pipeline, _) = pipeline(rendered, Ok("```html\n```".to_string()));
        let err = pipeline.run(&url()).await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("<p>x</p>"), "<p>x</p>");
        assert_eq!(strip_code_fence("```html\n<p>x</p>\n```"), "<p>x</p>");
        assert_eq!(strip_code_fence("  ```\n<p>x</p>```  "), "<p>x</p>");
        assert_eq!(strip_code_fence("<pre>```</pre>"), "<pre>```</pre>");
    }
}
