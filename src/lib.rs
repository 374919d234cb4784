//! sitesnap - website snapshot crawler and page clone pipeline
//!
//! Crawls a site breadth-first from a seed URL, rewrites every page so its
//! resource references are absolute, and can hand a rendered page to an
//! OpenAI-compatible model to produce a self-contained clone.

pub mod commands;
pub mod config;
pub mod crawl;
pub mod error;
pub mod generate;
pub mod models;
pub mod parse;
pub mod transform;

pub use config::Config;
pub use error::{Error, Result};
