//! CLI commands implementation

pub mod clone;
pub mod crawl;
pub mod download;
pub mod init;

pub use clone::*;
pub use crawl::*;
pub use download::*;
pub use init::*;
