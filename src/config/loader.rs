// Configuration loader
// Loads settings from ~/.pokedex/config.toml, falling back to defaults

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::constants::{CONFIG_DIR, CONFIG_FILENAME};
use super::settings::Config;

/// Default location of the config file, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILENAME))
}

/// Load configuration from `path` (or the default location).
///
/// A missing file is not an error: every field has a default. A file that
/// exists but does not parse is.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => {
                debug!("No home directory; using default configuration");
                return Ok(Config::default());
            }
        },
    };

    if !path.exists() {
        debug!("No config file at {}; using defaults", path.display());
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}
