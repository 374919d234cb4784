//! Markup parsing and normalization
//!
//! This module handles:
//! - URL resolution and same-domain checks
//! - A mutable document tree over a lenient HTML parse
//! - Rewriting resource URLs to absolute form and extracting page metadata

mod html;
mod resolve;
mod tree;

pub use html::*;
pub use resolve::*;
pub use tree::*;
