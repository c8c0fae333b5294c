// Interactive read-prompt loop

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::config::Config;

use super::commands::{handle_command, Command};
use super::editor::{LineEditor, ReadOutcome};
use super::history::HistoryStore;
use super::keys::KeyReader;
use super::shutdown::Shutdown;
use super::terminal::{RawModeGuard, RawTerminal, TerminalMode};

pub struct Repl<R, W> {
    keys: KeyReader<R>,
    editor: LineEditor<W>,
    history: Arc<Mutex<HistoryStore>>,
    terminal: Arc<dyn TerminalMode>,
    shutdown: Arc<Shutdown>,
}

impl Repl<io::StdinLock<'static>, io::Stdout> {
    /// Wire the REPL to the process's stdin/stdout and terminal.
    pub fn from_config(config: &Config) -> Self {
        let history = HistoryStore::open(config.history_path.as_deref(), config.history_limit);
        Self::new(
            KeyReader::stdin(),
            LineEditor::new(config.prompt.clone(), io::stdout()),
            history,
            Arc::new(RawTerminal::new()),
        )
    }
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(
        keys: KeyReader<R>,
        editor: LineEditor<W>,
        history: HistoryStore,
        terminal: Arc<dyn TerminalMode>,
    ) -> Self {
        let history = Arc::new(Mutex::new(history));
        let shutdown = Arc::new(Shutdown::new(Arc::clone(&terminal), Arc::clone(&history)));
        Self {
            keys,
            editor,
            history,
            terminal,
            shutdown,
        }
    }

    /// Shared shutdown routine, for the signal watcher.
    pub fn shutdown_handle(&self) -> Arc<Shutdown> {
        Arc::clone(&self.shutdown)
    }

    /// Exit the process cleanly on SIGINT/SIGTERM delivered outside the
    /// input stream.
    pub fn install_signal_watcher(&self) -> Result<()> {
        let shutdown = self.shutdown_handle();
        ctrlc::set_handler(move || {
            if shutdown.run("signal") {
                std::process::exit(0);
            }
        })
        .context("Failed to install signal handler")
    }

    /// Prompt until `exit`, end of input, or an interrupt.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let outcome = {
                let _raw = RawModeGuard::acquire(self.terminal.as_ref());
                self.editor.read_line(&mut self.keys, &self.history)
            };

            let line = match outcome {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::EndOfInput) => {
                    self.shutdown.run("end of input");
                    return Ok(());
                }
                Ok(ReadOutcome::Interrupted) => {
                    self.shutdown.run("interrupt");
                    return Ok(());
                }
                Err(e) => {
                    warn!("Terminal I/O failed: {}", e);
                    self.shutdown.run("terminal error");
                    return Ok(());
                }
            };

            self.lock_history().append(&line);

            let Some(command) = Command::parse(&line) else {
                continue;
            };
            debug!("Dispatching {:?}", command);

            if command == Command::Exit {
                self.shutdown.run("exit command");
                return Ok(());
            }

            let output = handle_command(&command, &self.lock_history());
            if let Err(e) = self.print(&output) {
                warn!("Failed to write command output: {}", e);
                self.shutdown.run("terminal error");
                return Ok(());
            }
        }
    }

    fn print(&mut self, output: &str) -> io::Result<()> {
        let out = self.editor.writer_mut();
        out.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, HistoryStore> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
