//! Configuration management for sitesnap
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Crawling and static fetch configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Headless browser configuration
    #[serde(default)]
    pub render: RenderConfig,

    /// Text generation configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Web crawling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum pages to return from one crawl (hard cap)
    #[serde(default = "default_crawl_max_pages")]
    pub max_pages: u32,

    /// Static fetch timeout in seconds
    #[serde(default = "default_crawl_timeout")]
    pub timeout_secs: u64,

    /// Serialized HTML is cut to this many characters
    #[serde(default = "default_max_html_chars")]
    pub max_html_chars: usize,

    /// User agent string
    #[serde(default = "default_crawl_user_agent")]
    pub user_agent: String,

    /// Redirects followed by a static fetch
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// Headless browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Time to wait for navigation to finish (milliseconds)
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout_ms: u64,

    /// Quiet period after load for late network activity (milliseconds)
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Run browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Enable sandbox (disable for Docker/CI environments)
    #[serde(default = "default_true")]
    pub sandbox: bool,
}

/// Text generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// API key stored directly in the config file (takes precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_generation_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Generation settings with every required field present.
///
/// Built by [`Config::resolve_generation`]; constructing a generator takes this
/// instead of reading the environment itself.
#[derive(Debug, Clone)]
pub struct ResolvedGenerationConfig {
    pub base_url: Url,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for sitesnap data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: default_crawl_max_pages(),
            timeout_secs: default_crawl_timeout(),
            max_html_chars: default_max_html_chars(),
            user_agent: default_crawl_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_load_timeout_ms: default_page_load_timeout(),
            settle_ms: default_settle_ms(),
            headless: true,
            sandbox: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            api_key: None,
            api_key_env: default_generation_api_key_env(),
            timeout_secs: default_generation_timeout(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Config {
    /// Get the default base directory for sitesnap (~/.sitesnap)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sitesnap")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    /// when no config file exists there
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.crawl.max_pages == 0 {
            return Err(Error::Config("crawl.max_pages must be >= 1".to_string()));
        }

        if self.crawl.timeout_secs == 0 {
            return Err(Error::Config(
                "crawl.timeout_secs must be >= 1".to_string(),
            ));
        }

        if self.crawl.max_html_chars == 0 {
            return Err(Error::Config(
                "crawl.max_html_chars must be >= 1".to_string(),
            ));
        }

        if self.generation.timeout_secs == 0 {
            return Err(Error::Config(
                "generation.timeout_secs must be >= 1".to_string(),
            ));
        }

        if self.generation.max_output_tokens == 0 {
            return Err(Error::Config(
                "generation.max_output_tokens must be >= 1".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::Config(
                "generation.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        Url::parse(&self.generation.base_url).map_err(|e| {
            Error::Config(format!("generation.base_url is not a valid URL: {}", e))
        })?;

        Ok(())
    }

    /// Collect everything the generation client needs, failing if no API key
    /// is configured
    pub fn resolve_generation(&self) -> Result<ResolvedGenerationConfig> {
        let gen = &self.generation;
        let api_key = gen
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(&gen.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
            .ok_or_else(|| {
                Error::Config(format!(
                    "No generation API key: set generation.api_key or the {} environment variable",
                    gen.api_key_env
                ))
            })?;

        // Url::join drops the last path segment unless the base ends in '/'
        let mut base = gen.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid generation base URL: {}", e)))?;

        Ok(ResolvedGenerationConfig {
            base_url,
            model: gen.model.clone(),
            api_key,
            timeout: Duration::from_secs(gen.timeout_secs),
            max_output_tokens: gen.max_output_tokens,
            temperature: gen.temperature,
        })
    }
}
