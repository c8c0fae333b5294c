// CLI module
// Line editing, history, terminal control and the read-prompt loop

mod commands;
mod editor;
mod history;
mod keys;
mod repl;
mod shutdown;
mod terminal;

pub use commands::{clean_input, handle_command, Command};
pub use editor::{EditSession, LineEditor, ReadOutcome, Step};
pub use history::{HistoryError, HistoryStore};
pub use keys::{Key, KeyReader};
pub use repl::Repl;
pub use shutdown::Shutdown;
pub use terminal::{RawModeGuard, RawTerminal, TerminalMode};
