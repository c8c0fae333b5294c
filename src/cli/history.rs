// Command history with crash-durable, size-bounded persistence
//
// Entries are kept verbatim, one per line. Every commit is appended to the
// backing file immediately; on orderly shutdown the file is rewritten to
// hold only the most recent `limit` entries.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to open history file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read history file: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write history file: {0}")]
    Write(#[source] io::Error),
}

/// Ordered, oldest-first sequence of submitted lines.
#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<String>,
    limit: usize,
    path: Option<PathBuf>,
    /// `None` once persistence is disabled
    file: Option<File>,
}

impl HistoryStore {
    /// History that lives only as long as the process.
    pub fn memory_only(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
            path: None,
            file: None,
        }
    }

    /// Open (or create) the backing file and read its entries.
    ///
    /// Never fails: if the file cannot be opened or read the store carries
    /// on in memory with whatever was read so far.
    pub fn load(path: impl AsRef<Path>, limit: usize) -> Self {
        let path = path.as_ref();
        let mut store = Self::memory_only(limit);

        let mut file = match open_backing(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("History disabled: {}", e);
                return store;
            }
        };

        match read_entries(&mut file) {
            Ok(entries) => store.entries = entries,
            Err(e) => {
                warn!("History disabled: {}", e);
                return store;
            }
        }

        debug!(
            "Loaded {} history entries from {}",
            store.entries.len(),
            path.display()
        );
        store.path = Some(path.to_path_buf());
        store.file = Some(file);
        store
    }

    /// Load from `path` when one is configured, otherwise stay in memory.
    pub fn open(path: Option<&Path>, limit: usize) -> Self {
        match path {
            Some(p) => Self::load(p, limit),
            None => {
                debug!("{}; history kept in memory only", HistoryError::NoHomeDir);
                Self::memory_only(limit)
            }
        }
    }

    /// Record a committed line and persist it right away.
    pub fn append(&mut self, entry: &str) {
        self.entries.push(entry.to_string());

        if let Some(file) = self.file.as_mut() {
            if let Err(e) = append_line(file, entry) {
                warn!("{}", e);
            }
        }
    }

    /// Trim to the newest `limit` entries and rewrite the backing file.
    ///
    /// On a write failure the truncation is abandoned and the file is left
    /// as the partial rewrite left it. Persistence ends here: later appends
    /// stay in memory.
    pub fn finalize(&mut self) {
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }

        let Some(mut file) = self.file.take() else {
            return;
        };

        match rewrite(&mut file, &self.entries) {
            Ok(()) => info!("Saved {} history entries", self.entries.len()),
            Err(e) => warn!("History not truncated: {}", e),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_persistent(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn open_backing(path: &Path) -> Result<File, HistoryError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .map_err(|source| HistoryError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn read_entries(file: &mut File) -> Result<Vec<String>, HistoryError> {
    file.seek(SeekFrom::Start(0)).map_err(HistoryError::Read)?;

    let mut entries = Vec::new();
    for line in BufReader::new(&*file).split(b'\n') {
        let mut line = line.map_err(HistoryError::Read)?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        entries.push(String::from_utf8_lossy(&line).into_owned());
    }
    Ok(entries)
}

fn append_line(file: &mut File, entry: &str) -> Result<(), HistoryError> {
    file.seek(SeekFrom::End(0)).map_err(HistoryError::Write)?;
    file.write_all(entry.as_bytes()).map_err(HistoryError::Write)?;
    file.write_all(b"\n").map_err(HistoryError::Write)?;
    file.flush().map_err(HistoryError::Write)
}

/// A seekable sink that can be cut to length.
trait Truncate: Write + Seek {
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

fn rewrite<B: Truncate>(file: &mut B, entries: &[String]) -> Result<(), HistoryError> {
    file.seek(SeekFrom::Start(0)).map_err(HistoryError::Write)?;

    let mut written: u64 = 0;
    for entry in entries {
        file.write_all(entry.as_bytes()).map_err(HistoryError::Write)?;
        file.write_all(b"\n").map_err(HistoryError::Write)?;
        written += entry.len() as u64 + 1;
    }

    file.flush().map_err(HistoryError::Write)?;
    file.truncate(written).map_err(HistoryError::Write)
}
