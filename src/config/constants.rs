// Project-wide constants
//
// Centralised here so defaults have one source of truth.
// Import via `use crate::config::constants::*;`.

/// History file name, resolved relative to the user's home directory.
pub const HISTORY_FILENAME: &str = ".pokedex_history";

/// Number of history entries kept on disk after an orderly shutdown.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Prompt printed at the start of every input line.
pub const DEFAULT_PROMPT: &str = "Pokedex > ";

/// Directory (under home) holding the optional config file.
pub const CONFIG_DIR: &str = ".pokedex";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILENAME: &str = "config.toml";

/// Printed once by the shutdown routine.
pub const FAREWELL: &str = "Closing the Pokedex... Goodbye!";
