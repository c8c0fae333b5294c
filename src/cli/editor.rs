// Single-line editor with history recall
//
// The editor is byte oriented: the buffer only ever grows by printable
// ASCII, and Backspace removes exactly one byte. History entries can be
// recalled with Up/Down; edits made to a recalled entry are kept in an
// overlay for the rest of the prompt cycle and thrown away on commit.

use crossterm::{
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, PoisonError};

use super::history::HistoryStore;
use super::keys::{Key, KeyReader};

/// How a prompt cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Enter was pressed; the exact buffer contents.
    Line(String),
    /// Input stream ended or failed.
    EndOfInput,
    /// Ctrl+C / Ctrl+D arrived in-band.
    Interrupted,
}

/// Result of feeding one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done(ReadOutcome),
}

/// Live state of the line being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Position in history; `history.len()` means a fresh line.
    history_index: usize,
    buffer: Vec<u8>,
    /// Fresh-line buffer saved when navigation first leaves the sentinel
    current_input: Vec<u8>,
    /// Uncommitted edits per visited history slot
    modifications: HashMap<usize, Vec<u8>>,
}

impl EditSession {
    /// Start composing a fresh line against a history of `history_len`.
    pub fn new(history_len: usize) -> Self {
        Self {
            history_index: history_len,
            buffer: Vec::new(),
            current_input: Vec::new(),
            modifications: HashMap::new(),
        }
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Buffer as text (lossy only for non-UTF-8 history entries).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn modifications(&self) -> &HashMap<usize, Vec<u8>> {
        &self.modifications
    }

    /// Buffer contents for `index`: pending edit first, else trimmed entry.
    fn slot_contents(&self, index: usize, history: &HistoryStore) -> Vec<u8> {
        match self.modifications.get(&index) {
            Some(edited) => edited.clone(),
            None => history
                .get(index)
                .map(|entry| entry.trim().as_bytes().to_vec())
                .unwrap_or_default(),
        }
    }

    /// Move one entry back. Returns whether the buffer changed slot.
    fn previous(&mut self, history: &HistoryStore) -> bool {
        let len = history.len();
        if self.history_index >= len {
            self.current_input = self.buffer.clone();
        } else {
            self.modifications
                .insert(self.history_index, self.buffer.clone());
        }

        // A shrunk history never leaves the index past the sentinel
        let current = self.history_index.min(len);
        if current == 0 {
            return false;
        }
        self.history_index = current - 1;
        self.buffer = self.slot_contents(self.history_index, history);
        true
    }

    /// Move one entry forward. Returns whether the buffer changed slot.
    fn next(&mut self, history: &HistoryStore) -> bool {
        let len = history.len();
        if self.history_index + 1 < len {
            self.modifications
                .insert(self.history_index, self.buffer.clone());
            self.history_index += 1;
            self.buffer = self.slot_contents(self.history_index, history);
            true
        } else if self.history_index + 1 == len {
            self.modifications
                .insert(self.history_index, self.buffer.clone());
            self.history_index = len;
            self.buffer = self.current_input.clone();
            true
        } else {
            false
        }
    }
}

/// Renders the prompt and applies keys to an [`EditSession`].
pub struct LineEditor<W> {
    prompt: String,
    out: W,
}

impl<W: Write> LineEditor<W> {
    pub fn new(prompt: impl Into<String>, out: W) -> Self {
        Self {
            prompt: prompt.into(),
            out,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Print the prompt and open a fresh session at the sentinel.
    pub fn begin(&mut self, history: &HistoryStore) -> io::Result<EditSession> {
        self.out.write_all(self.prompt.as_bytes())?;
        self.out.flush()?;
        Ok(EditSession::new(history.len()))
    }

    /// Apply one key to `session`, echoing or redrawing as needed.
    pub fn feed(
        &mut self,
        session: &mut EditSession,
        key: Key,
        history: &HistoryStore,
    ) -> io::Result<Step> {
        match key {
            Key::Char(byte) => {
                session.buffer.push(byte);
                self.out.write_all(&[byte])?;
            }
            Key::Backspace => {
                if session.buffer.pop().is_some() {
                    self.out.write_all(b"\x08 \x08")?;
                }
            }
            Key::Enter => {
                self.out.write_all(b"\r\n")?;
                self.out.flush()?;
                session.modifications.clear();
                let line = session.text();
                return Ok(Step::Done(ReadOutcome::Line(line)));
            }
            Key::EndOfInput => {
                self.out.write_all(b"\r\n")?;
                self.out.flush()?;
                return Ok(Step::Done(ReadOutcome::EndOfInput));
            }
            Key::Interrupt => {
                self.out.write_all(b"\r\n")?;
                self.out.flush()?;
                return Ok(Step::Done(ReadOutcome::Interrupted));
            }
            Key::Up => {
                if session.previous(history) {
                    self.redraw(session)?;
                }
            }
            Key::Down => {
                if session.next(history) {
                    self.redraw(session)?;
                }
            }
            Key::Ignored => {}
        }

        self.out.flush()?;
        Ok(Step::Continue)
    }

    /// Run one prompt cycle to completion.
    ///
    /// `history` is only locked while a key is applied, never during the
    /// blocking read.
    pub fn read_line<R: BufRead>(
        &mut self,
        keys: &mut KeyReader<R>,
        history: &Mutex<HistoryStore>,
    ) -> io::Result<ReadOutcome> {
        let mut session = {
            let history = history.lock().unwrap_or_else(PoisonError::into_inner);
            self.begin(&history)?
        };

        loop {
            let key = keys.next_key();
            let history = history.lock().unwrap_or_else(PoisonError::into_inner);
            if let Step::Done(outcome) = self.feed(&mut session, key, &history)? {
                return Ok(outcome);
            }
        }
    }

    /// Erase the current line and reprint prompt + buffer.
    fn redraw(&mut self, session: &EditSession) -> io::Result<()> {
        queue!(
            self.out,
            Print("\r"),
            Clear(ClearType::UntilNewLine),
            Print(&self.prompt)
        )?;
        self.out.write_all(&session.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> HistoryStore {
        let mut store = HistoryStore::memory_only(100);
        for entry in entries {
            store.append(entry);
        }
        store
    }

    fn editor() -> LineEditor<Vec<u8>> {
        LineEditor::new("> ", Vec::new())
    }

    fn feed_all(
        editor: &mut LineEditor<Vec<u8>>,
        session: &mut EditSession,
        keys: &[Key],
        history: &HistoryStore,
    ) -> Step {
        let mut last = Step::Continue;
        for key in keys {
            last = editor.feed(session, *key, history).unwrap();
        }
        last
    }

    fn type_str(text: &str) -> Vec<Key> {
        text.bytes().map(Key::Char).collect()
    }

    #[test]
    fn test_printable_bytes_commit_verbatim() {
        let history = history(&[]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        let mut keys = type_str(" catch  Pikachu! ");
        keys.push(Key::Enter);
        let step = feed_all(&mut ed, &mut session, &keys, &history);

        assert_eq!(
            step,
            Step::Done(ReadOutcome::Line(" catch  Pikachu! ".to_string()))
        );
        assert_eq!(ed.writer().as_slice(), b">  catch  Pikachu! \r\n");
    }

    #[test]
    fn test_backspace_undoes_append() {
        let history = history(&[]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &type_str("map"), &history);
        let before = session.buffer().to_vec();
        feed_all(&mut ed, &mut session, &[Key::Char(b'x'), Key::Backspace], &history);

        assert_eq!(session.buffer(), before.as_slice());
        assert!(ed.writer().ends_with(b"x\x08 \x08"));
    }

    #[test]
    fn test_backspace_on_empty_buffer_is_silent() {
        let history = history(&[]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &[Key::Backspace], &history);
        assert!(session.buffer().is_empty());
        assert_eq!(ed.writer().as_slice(), b"> ");
    }

    #[test]
    fn test_up_then_down_restores_fresh_line() {
        let history = history(&["abc"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &[Key::Up], &history);
        assert_eq!(session.buffer(), b"abc");
        assert_eq!(session.history_index(), 0);

        feed_all(&mut ed, &mut session, &[Key::Down], &history);
        assert_eq!(session.buffer(), b"");
        assert_eq!(session.history_index(), 1);
    }

    #[test]
    fn test_round_trip_through_history() {
        let history = history(&["map", "explore pallet-town", "catch pikachu"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();
        feed_all(&mut ed, &mut session, &type_str("insp"), &history);

        feed_all(&mut ed, &mut session, &[Key::Up; 3], &history);
        assert_eq!(session.buffer(), b"map");
        feed_all(&mut ed, &mut session, &[Key::Down; 3], &history);

        assert_eq!(session.buffer(), b"insp");
        assert_eq!(session.history_index(), 3);
    }

    #[test]
    fn test_recalled_entries_are_trimmed() {
        let history = history(&["  explore pallet-town \t"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &[Key::Up], &history);
        assert_eq!(session.buffer(), b"explore pallet-town");
    }

    #[test]
    fn test_edits_survive_navigation() {
        let history = history(&["map", "help"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &[Key::Up, Key::Up], &history);
        assert_eq!(session.buffer(), b"map");
        let mut keys = vec![Key::Backspace; 3];
        keys.extend(type_str("mapb"));
        feed_all(&mut ed, &mut session, &keys, &history);

        feed_all(&mut ed, &mut session, &[Key::Down, Key::Up], &history);
        assert_eq!(session.buffer(), b"mapb");
        assert_eq!(history.get(0), Some("map"));
    }

    #[test]
    fn test_commit_clears_overlay() {
        let history = history(&["map"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        let mut keys = vec![Key::Up, Key::Char(b'b'), Key::Down, Key::Up];
        keys.push(Key::Enter);
        let step = feed_all(&mut ed, &mut session, &keys, &history);
        assert_eq!(step, Step::Done(ReadOutcome::Line("mapb".to_string())));
        assert!(session.modifications().is_empty());

        let mut session = ed.begin(&history).unwrap();
        feed_all(&mut ed, &mut session, &[Key::Up], &history);
        assert_eq!(session.buffer(), b"map");
    }

    #[test]
    fn test_up_at_oldest_entry_is_noop() {
        let history = history(&["map"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &[Key::Up], &history);
        let output_len = ed.writer().len();
        let buffer = session.buffer().to_vec();

        feed_all(&mut ed, &mut session, &[Key::Up], &history);
        assert_eq!(session.history_index(), 0);
        assert_eq!(session.buffer(), buffer.as_slice());
        assert_eq!(ed.writer().len(), output_len);
    }

    #[test]
    fn test_down_at_sentinel_is_noop() {
        let history = history(&["map"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();
        feed_all(&mut ed, &mut session, &type_str("he"), &history);
        let before = session.clone();
        let output_len = ed.writer().len();

        feed_all(&mut ed, &mut session, &[Key::Down], &history);
        assert_eq!(session, before);
        assert_eq!(ed.writer().len(), output_len);
    }

    #[test]
    fn test_navigation_with_empty_history_is_noop() {
        let history = history(&[]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();
        feed_all(&mut ed, &mut session, &type_str("x"), &history);

        feed_all(&mut ed, &mut session, &[Key::Up, Key::Down], &history);
        assert_eq!(session.buffer(), b"x");
        assert_eq!(session.history_index(), 0);
        assert_eq!(ed.writer().as_slice(), b"> x");
    }

    #[test]
    fn test_redraw_clears_line_and_reprints_prompt() {
        let history = history(&["help"]);
        let mut ed = editor();
        let mut session = ed.begin(&history).unwrap();

        feed_all(&mut ed, &mut session, &[Key::Up], &history);
        assert!(ed.writer().ends_with(b"\r\x1b[K> help"));
    }

    #[test]
    fn test_interrupt_and_end_of_input() {
        let history = history(&[]);
        let mut ed = editor();

        let mut session = ed.begin(&history).unwrap();
        let step = feed_all(&mut ed, &mut session, &[Key::Char(b'a'), Key::Interrupt], &history);
        assert_eq!(step, Step::Done(ReadOutcome::Interrupted));

        let mut session = ed.begin(&history).unwrap();
        let step = feed_all(&mut ed, &mut session, &[Key::EndOfInput], &history);
        assert_eq!(step, Step::Done(ReadOutcome::EndOfInput));
    }

    #[test]
    fn test_read_line_from_byte_stream() {
        let history = Mutex::new(history(&["map"]));
        let mut ed = editor();
        let mut keys = KeyReader::new(&b"x\x7f\x1b[Ab\r"[..]);

        let outcome = ed.read_line(&mut keys, &history).unwrap();
        assert_eq!(outcome, ReadOutcome::Line("mapb".to_string()));

        let outcome = ed.read_line(&mut keys, &history).unwrap();
        assert_eq!(outcome, ReadOutcome::EndOfInput);
    }
}
