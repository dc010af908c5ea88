//! Incremental writing of a single JSON array
//!
//! The opening bracket is written immediately when opening the
//! destination, each element is written and flushed as soon as it
//! is appended, and the closing bracket is written when closing.
//! Only a single element is kept in memory at any time.
//!
//! The output remains a valid JSON document as long as the writer
//! is closed, either explicitly or implicitly when dropped. If the
//! process is killed before, the output is a prefix of a valid
//! array that only lacks the closing bracket.

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{BufWriter, Error as IoError, Result as IoResult, Write},
    path::{Path, PathBuf},
};

use fs2::FileExt as _;
use serde::Serialize;
use thiserror::Error;

use super::CountingWrite;

const ARRAY_START: &[u8] = b"[";
const ELEMENT_SEPARATOR: &[u8] = b",\n";
const ARRAY_END: &[u8] = b"]";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WriterState {
    Unopened,
    Open { has_written_first_element: bool },
    Closed,
}

impl WriterState {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unopened => f.write_str("unopened"),
            Self::Open { .. } => f.write_str("open"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// The destination could not be opened for writing
    #[error("cannot open {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },

    /// The element has been dropped, the writer remains usable
    #[error("failed to serialize element: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error(transparent)]
    Io(#[from] IoError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct JsonArrayWriter<W: Write> {
    state: WriterState,
    writer: Option<CountingWrite<W>>,
    elements_written: u64,
    bytes_written: u64,
    // Reused for serializing elements before writing them
    element_buf: Vec<u8>,
}

impl<W: Write> Default for JsonArrayWriter<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> JsonArrayWriter<W> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: WriterState::Unopened,
            writer: None,
            elements_written: 0,
            bytes_written: 0,
            element_buf: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> WriterState {
        self.state
    }

    #[must_use]
    pub const fn elements_written(&self) -> u64 {
        self.elements_written
    }

    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.writer
            .as_ref()
            .map_or(self.bytes_written, CountingWrite::bytes_written)
    }

    /// Start the array on the given destination
    pub fn open(&mut self, writer: W) -> Result<()> {
        if self.state != WriterState::Unopened {
            return Err(Error::InvalidState {
                operation: "open",
                state: self.state,
            });
        }
        let mut writer = CountingWrite::from_writer(writer);
        writer.write_all(ARRAY_START)?;
        writer.flush()?;
        self.writer = Some(writer);
        self.state = WriterState::Open {
            has_written_first_element: false,
        };
        Ok(())
    }

    /// Serialize and write a single element
    ///
    /// If serialization fails nothing is written and the writer remains open.
    pub fn append_element<T>(&mut self, element: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let has_written_first_element = match self.state {
            WriterState::Open {
                has_written_first_element,
            } => has_written_first_element,
            state => {
                return Err(Error::InvalidState {
                    operation: "append element",
                    state,
                });
            }
        };
        self.element_buf.clear();
        if has_written_first_element {
            self.element_buf.extend_from_slice(ELEMENT_SEPARATOR);
        }
        serde_json::to_writer_pretty(&mut self.element_buf, element)
            .map_err(Error::Serialization)?;
        let Some(writer) = self.writer.as_mut() else {
            return Err(Error::InvalidState {
                operation: "append element",
                state: self.state,
            });
        };
        let bytes_before = writer.bytes_written();
        if let Err(err) = writer.write_all(&self.element_buf) {
            if writer.bytes_written() > bytes_before {
                // A partial element is already in the output, the next
                // one still needs a separator
                self.state = WriterState::Open {
                    has_written_first_element: true,
                };
            }
            return Err(err.into());
        }
        // The element is owned by the destination now, even if flushing fails
        self.state = WriterState::Open {
            has_written_first_element: true,
        };
        self.elements_written += 1;
        writer.flush()?;
        Ok(())
    }

    /// Terminate the array and release the destination
    ///
    /// Closing a writer that has already been closed has no effect.
    /// The writer is closed afterwards even if writing the closing
    /// bracket failed.
    pub fn close(&mut self) -> Result<()> {
        self.close_and_release().map(drop)
    }

    /// Close and hand back the destination (if it was still open)
    pub fn finish(mut self) -> Result<Option<W>> {
        self.close_and_release()
    }

    fn close_and_release(&mut self) -> Result<Option<W>> {
        let last_state = std::mem::replace(&mut self.state, WriterState::Closed);
        let Some(mut writer) = self.writer.take() else {
            debug_assert!(!last_state.is_open());
            return Ok(None);
        };
        let closed = writer.write_all(ARRAY_END).and_then(|()| writer.flush());
        self.bytes_written = writer.bytes_written();
        closed?;
        log::debug!(
            "Closed JSON array with {} element(s) after writing {} byte(s)",
            self.elements_written,
            self.bytes_written
        );
        Ok(Some(writer.into_inner()))
    }
}

impl<W: Write> Drop for JsonArrayWriter<W> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("Failed to close JSON array: {}", err);
        }
    }
}

pub type FileWriter = BufWriter<File>;

pub type JsonArrayFileWriter = JsonArrayWriter<FileWriter>;

fn create_locked_file(path: &Path) -> IoResult<File> {
    let file = OpenOptions::new().write(true).create(true).open(path)?;
    // Lock before truncating to leave files of other writers untouched
    file.try_lock_exclusive()?;
    file.set_len(0)?;
    Ok(file)
}

impl JsonArrayWriter<FileWriter> {
    /// Create or truncate the file and start the array
    ///
    /// Fails if the file is already locked by another writer.
    /// All failures are reported as [`Error::Open`].
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        if self.state != WriterState::Unopened {
            return Err(Error::InvalidState {
                operation: "open",
                state: self.state,
            });
        }
        let open_error = |err: IoError| Error::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let file = create_locked_file(path).map_err(open_error)?;
        self.open(BufWriter::new(file)).map_err(|err| match err {
            Error::Io(err) => open_error(err),
            err => err,
        })?;
        log::debug!("Opened JSON array file {}", path.display());
        Ok(())
    }

    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = Self::new();
        writer.open_file(path)?;
        Ok(writer)
    }
}
