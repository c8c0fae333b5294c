// Terminal mode switching (raw <-> canonical)

use crossterm::terminal;
use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Switches the controlling terminal between raw and canonical mode.
///
/// Both operations are best-effort: a failure (stdin is a pipe, no tty)
/// is logged and otherwise ignored so the editor still works over a
/// non-interactive stream.
pub trait TerminalMode: Send + Sync {
    /// Character-at-a-time, unbuffered, no echo.
    fn enter(&self);
    /// Line-buffered with echo.
    fn restore(&self);
}

/// crossterm-backed controller for the process's terminal.
#[derive(Debug, Default)]
pub struct RawTerminal {
    raw: AtomicBool,
}

impl RawTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_raw(&self) -> bool {
        self.raw.load(Ordering::SeqCst)
    }
}

impl TerminalMode for RawTerminal {
    fn enter(&self) {
        if !io::stdin().is_terminal() {
            debug!("stdin is not a terminal; staying in canonical mode");
            return;
        }
        match terminal::enable_raw_mode() {
            Ok(()) => self.raw.store(true, Ordering::SeqCst),
            Err(e) => debug!("Failed to enable raw mode: {}", e),
        }
    }

    fn restore(&self) {
        if !self.raw.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = terminal::disable_raw_mode() {
            debug!("Failed to disable raw mode: {}", e);
        }
    }
}

/// Raw mode lifetime guard so the terminal is restored on any return path.
pub struct RawModeGuard<'a> {
    terminal: &'a dyn TerminalMode,
}

impl<'a> RawModeGuard<'a> {
    pub fn acquire(terminal: &'a dyn TerminalMode) -> Self {
        terminal.enter();
        Self { terminal }
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        self.terminal.restore();
    }
}
