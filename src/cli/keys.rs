// Key decoding - turns a raw byte stream into logical keys

use std::io::{self, BufRead, ErrorKind};
use tracing::debug;

const ETX: u8 = 0x03;
const EOT: u8 = 0x04;
const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// One logical unit of input: a single byte or a complete escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable ASCII (0x20..=0x7e)
    Char(u8),
    Backspace,
    Enter,
    /// Ctrl+C / Ctrl+D arriving in-band
    Interrupt,
    Up,
    Down,
    /// Consumed without effect (unknown control byte or escape sequence)
    Ignored,
    /// Stream ended or could not be read
    EndOfInput,
}

/// Blocking reader yielding one [`Key`] per call.
pub struct KeyReader<R> {
    inner: R,
}

impl<R: BufRead> KeyReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Block until the next key is available.
    ///
    /// Read failures are reported as `EndOfInput`, including a stream that
    /// ends in the middle of an escape sequence.
    pub fn next_key(&mut self) -> Key {
        let byte = match self.read_byte() {
            Some(b) => b,
            None => return Key::EndOfInput,
        };

        match byte {
            b'\n' | b'\r' => Key::Enter,
            DEL => Key::Backspace,
            ETX | EOT => Key::Interrupt,
            ESC => self.escape_sequence(),
            0x20..=0x7e => Key::Char(byte),
            _ => Key::Ignored,
        }
    }

    fn escape_sequence(&mut self) -> Key {
        match self.read_byte() {
            Some(b'[') => {}
            Some(_) => return Key::Ignored,
            None => return Key::EndOfInput,
        }
        match self.read_byte() {
            Some(b'A') => Key::Up,
            Some(b'B') => Key::Down,
            Some(_) => Key::Ignored,
            None => Key::EndOfInput,
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        loop {
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("Input read failed: {}", e);
                    return None;
                }
            };
            let byte = *buf.first()?;
            self.inner.consume(1);
            return Some(byte);
        }
    }
}

impl<R: BufRead> Iterator for KeyReader<R> {
    type Item = Key;

    /// Yields keys until the stream ends; the final `EndOfInput` is not
    /// produced.
    fn next(&mut self) -> Option<Key> {
        match self.next_key() {
            Key::EndOfInput => None,
            key => Some(key),
        }
    }
}

impl KeyReader<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}
