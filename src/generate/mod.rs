//! Text generation
//!
//! An abstraction over generative text models with an HTTP backend for
//! OpenAI-compatible chat completion APIs.

mod http_backend;

pub use http_backend::*;

use crate::config::ResolvedGenerationConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Trait for text generation providers
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete a prompt. `system` is the fixed instruction, `prompt` the
    /// request-specific input.
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Create a generator based on configuration
pub fn create_generator(config: &ResolvedGenerationConfig) -> Result<Box<dyn TextGenerator>> {
    let generator = HttpGenerator::new(config)?;
    Ok(Box::new(generator))
}
