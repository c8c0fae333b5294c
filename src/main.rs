// Pokedex - interactive shell
// Main entry point

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pokedex::cli::Repl;
use pokedex::config::load_config;

/// Command-line interface for the interactive Pokedex shell.
#[derive(Debug, Parser)]
#[command(author, version, about = "Interactive Pokedex shell")]
struct Cli {
    /// Config file (default: ~/.pokedex/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// History file (default: ~/.pokedex_history)
    #[arg(long, value_name = "FILE", conflicts_with = "no_history")]
    history_file: Option<PathBuf>,

    /// Entries kept in the history file between sessions
    #[arg(long, value_name = "N")]
    history_limit: Option<usize>,

    /// Keep history in memory only
    #[arg(long)]
    no_history: bool,

    /// Increase log verbosity (-v info, -vv debug). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = cli.history_file {
        config.history_path = Some(path);
    }
    if cli.no_history {
        config.history_path = None;
    }
    if let Some(limit) = cli.history_limit {
        config.history_limit = limit;
    }
    config.validate()?;

    let mut repl = Repl::from_config(&config);
    repl.install_signal_watcher()?;
    repl.run()
}
