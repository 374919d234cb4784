//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default configuration file at `config_file` (or the default
/// location). Returns the path written.
pub fn cmd_init(config_file: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let mut config = Config::default();

    let config_file = config_file.unwrap_or_else(Config::default_config_path);
    config.paths.base_dir = config_file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_base_dir);
    config.paths.config_file = config_file;

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            config.paths.config_file.display()
        )));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;
    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    Ok(config.paths.config_file)
}
