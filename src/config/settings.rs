// Configuration structs

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::constants::{DEFAULT_HISTORY_LIMIT, DEFAULT_PROMPT, HISTORY_FILENAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backing file for command history.
    /// `None` keeps history in memory for the session only.
    pub history_path: Option<PathBuf>,

    /// Entries kept on disk when the session ends (oldest evicted first)
    pub history_limit: usize,

    /// Prompt printed before each line
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Reject settings the editor cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            bail!("history_limit must be at least 1");
        }
        if self.prompt.is_empty() {
            bail!("prompt must not be empty");
        }
        Ok(())
    }
}

/// `~/.pokedex_history`, or `None` when the home directory is unknown.
pub fn default_history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILENAME))
}
