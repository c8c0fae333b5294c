// One-shot shutdown routine shared by the read loop and the signal watcher

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::history::HistoryStore;
use super::terminal::TerminalMode;
use crate::config::constants::FAREWELL;

/// Restores the terminal and saves history exactly once, whichever
/// trigger gets here first.
pub struct Shutdown {
    done: AtomicBool,
    terminal: Arc<dyn TerminalMode>,
    history: Arc<Mutex<HistoryStore>>,
    /// Where the farewell goes; stdout unless replaced
    out: Mutex<Box<dyn Write + Send>>,
}

impl Shutdown {
    pub fn new(terminal: Arc<dyn TerminalMode>, history: Arc<Mutex<HistoryStore>>) -> Self {
        Self {
            done: AtomicBool::new(false),
            terminal,
            history,
            out: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Send the farewell somewhere other than stdout.
    pub fn set_output(&self, out: Box<dyn Write + Send>) {
        *self.out.lock().unwrap_or_else(PoisonError::into_inner) = out;
    }

    /// Run the shutdown side effects if nobody has yet.
    ///
    /// Returns `true` for the caller that actually performed them.
    pub fn run(&self, reason: &str) -> bool {
        if self
            .done
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Shutdown already in progress ({})", reason);
            return false;
        }

        info!("Shutting down: {}", reason);
        self.terminal.restore();
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finalize();

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", FAREWELL).and_then(|()| out.flush()) {
            debug!("Failed to print farewell: {}", e);
        }
        true
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}
