//! Default values for configuration

/// Default maximum pages per crawl
pub fn default_crawl_max_pages() -> u32 {
    5
}

/// Default request timeout in seconds
pub fn default_crawl_timeout() -> u64 {
    10
}

/// Default cap on serialized page size (characters)
pub fn default_max_html_chars() -> usize {
    200_000
}

/// Default user agent
pub fn default_crawl_user_agent() -> String {
    format!("sitesnap/{} (Site Snapshotter)", env!("CARGO_PKG_VERSION"))
}

/// Default redirect limit for static fetches
pub fn default_max_redirects() -> usize {
    5
}

/// Default time to wait for page load when rendering (milliseconds)
pub fn default_page_load_timeout() -> u64 {
    30000
}

/// Default quiet period after load before capturing the DOM (milliseconds)
pub fn default_settle_ms() -> u64 {
    2000
}

pub fn default_true() -> bool {
    true
}

/// Default OpenAI-compatible API base
pub fn default_generation_base_url() -> String {
    "https://api.openai.com/v1/".to_string()
}

pub fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default environment variable name for the generation API key
pub fn default_generation_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

/// Default generation request timeout in seconds
pub fn default_generation_timeout() -> u64 {
    120
}

pub fn default_max_output_tokens() -> u32 {
    4096
}

/// Low temperature keeps clones close to the source layout
pub fn default_temperature() -> f32 {
    0.2
}
