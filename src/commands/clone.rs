//! Clone command implementation

use crate::config::Config;
use crate::crawl::{RenderedFetcher, RendererConfig};
use crate::error::Result;
use crate::generate::create_generator;
use crate::models::CloneResult;
use crate::transform::{ClonePipeline, GenerationParams};
use tracing::info;
use url::Url;

/// Render `start_url` in a headless browser and generate a clone of it
pub async fn cmd_clone(config: &Config, start_url: &str) -> Result<CloneResult> {
    let url = Url::parse(start_url)?;
    info!("Received URL to clone: {}", url);

    let resolved = config.resolve_generation()?;
    let params = GenerationParams {
        max_output_tokens: resolved.max_output_tokens,
        temperature: resolved.temperature,
    };
    let generator = create_generator(&resolved)?;
    let renderer = RenderedFetcher::new(RendererConfig::from(&config.render));

    let pipeline = ClonePipeline::new(Box::new(renderer), generator, params);
    pipeline.run(&url).await
}
