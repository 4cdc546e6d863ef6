//! Durable store adapter
//!
//! The whole log is kept as one JSON document (an array of transaction
//! objects) in a seekable sink. Every persist rewrites the document from the
//! start and truncates the sink to the written length.
//!
//! # Limitations
//!
//! - O(log size) per write; there is no incremental append or compaction
//! - No atomic rename or write-ahead log: a crash mid-write leaves a torn
//!   document that fails the next `open` with `CorruptStore`

use crate::{error::{Error, Result}, types::Transaction};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Document written to an empty sink
pub const EMPTY_DOCUMENT: &[u8] = b"[]";

/// Seekable byte sink that can be cut to a given length
pub trait Sink: Read + Write + Seek {
    /// Truncate (or extend) the sink to `len` bytes
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Make written bytes durable
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for Cursor<Vec<u8>> {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.get_mut().resize(len, 0);
        Ok(())
    }
}

/// File-backed sink
#[derive(Debug)]
pub struct FileSink {
    file: File,
    sync_on_write: bool,
}

impl FileSink {
    /// Open (or create) the file at `path` for read and write
    pub fn open(path: impl AsRef<Path>, sync_on_write: bool) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        Ok(Self::new(file, sync_on_write))
    }

    /// Wrap an already opened file
    pub fn new(file: File, sync_on_write: bool) -> Self {
        Self {
            file,
            sync_on_write,
        }
    }
}

impl Read for FileSink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileSink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl Sink for FileSink {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.sync_on_write {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

/// Something that can durably hold the full log
pub trait Persist: fmt::Debug + Send {
    /// Replace the stored document with `log`
    fn persist(&mut self, log: &[&Transaction]) -> Result<()>;

    /// Size of the current document in bytes
    fn document_len(&self) -> u64;
}

/// JSON document store over a [`Sink`]
#[derive(Debug)]
pub struct JsonStore<S> {
    sink: S,
    document_len: u64,
}

impl<S: Sink> JsonStore<S> {
    /// Open a store, returning the persisted log
    ///
    /// An empty sink is initialised with `[]`. Content that does not parse
    /// as a transaction list fails with `CorruptStore`.
    pub fn open(mut sink: S) -> Result<(Self, Vec<Transaction>)> {
        let len = sink.seek(SeekFrom::End(0))?;
        sink.seek(SeekFrom::Start(0))?;

        if len == 0 {
            sink.write_all(EMPTY_DOCUMENT)?;
            sink.flush()?;
            sink.sync()?;
            sink.seek(SeekFrom::Start(0))?;

            tracing::info!("Initialized empty ledger store");

            let store = Self {
                sink,
                document_len: EMPTY_DOCUMENT.len() as u64,
            };
            return Ok((store, Vec::new()));
        }

        let mut content = Vec::new();
        sink.read_to_end(&mut content)?;

        let transactions: Vec<Transaction> =
            serde_json::from_slice(&content).map_err(Error::CorruptStore)?;

        tracing::info!(
            bytes = len,
            transactions = transactions.len(),
            "Loaded ledger store"
        );

        Ok((
            Self {
                sink,
                document_len: len,
            },
            transactions,
        ))
    }

    /// Rewrite the whole document
    pub fn write(&mut self, log: &[&Transaction]) -> Result<()> {
        let document = serde_json::to_vec(log)?;
        let len = document.len() as u64;

        self.sink.seek(SeekFrom::Start(0))?;
        self.sink.write_all(&document)?;
        self.sink.set_len(len)?;
        self.sink.flush()?;
        self.sink.sync()?;

        self.document_len = len;

        tracing::debug!(bytes = len, transactions = log.len(), "Store rewritten");

        Ok(())
    }

    /// Borrow the underlying sink
    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    /// Unwrap the underlying sink
    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: Sink + fmt::Debug + Send> Persist for JsonStore<S> {
    fn persist(&mut self, log: &[&Transaction]) -> Result<()> {
        self.write(log)
    }

    fn document_len(&self) -> u64 {
        self.document_len
    }
}
