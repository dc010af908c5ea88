//! Side-channel for reporting problems of the logger itself

use std::{
    error::Error as StdError,
    fmt::{self, Write as _},
    fs::{File, OpenOptions},
    io::{LineWriter, Result as IoResult, Write as _},
    path::{Path, PathBuf},
};

use crate::time::Timestamp;

pub const DIAGNOSTICS_FILE_SUFFIX: &str = ".log";

pub trait Diagnostics: fmt::Debug {
    fn write_message(&mut self, text: &str);

    fn write_exception(&mut self, error: &(dyn StdError + 'static));
}

/// Format an error followed by all of its sources
#[must_use]
pub fn format_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut formatted = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        // Writing into a String never fails
        let _ = write!(formatted, ": {cause}");
        source = cause.source();
    }
    formatted
}

/// Forwards everything to the application log
#[derive(Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn write_message(&mut self, text: &str) {
        log::info!("{}", text);
    }

    fn write_exception(&mut self, error: &(dyn StdError + 'static)) {
        log::warn!("{}", format_error_chain(error));
    }
}

/// Appends timestamped lines to a text file
///
/// The file is named after the time of its creation.
#[derive(Debug)]
pub struct FileDiagnostics {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl FileDiagnostics {
    /// Create a new file in the given directory
    pub fn create_in(dir: &Path) -> IoResult<Self> {
        let created_at = Timestamp::now();
        let mut path = dir.to_path_buf();
        path.push(format!(
            "{}{}",
            created_at.format_file_name(),
            DIAGNOSTICS_FILE_SUFFIX
        ));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        log::debug!("Writing diagnostics into {}", path.display());
        Ok(Self {
            path,
            writer: LineWriter::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, text: &str) {
        let line = format!("{} {}", Timestamp::now(), text);
        if let Err(err) = writeln!(self.writer, "{line}") {
            // Nowhere else to go
            log::warn!("Failed to write diagnostics {}: {}", line, err);
        }
    }
}

impl Diagnostics for FileDiagnostics {
    fn write_message(&mut self, text: &str) {
        self.write_line(text);
    }

    fn write_exception(&mut self, error: &(dyn StdError + 'static)) {
        self.write_line(&format!("ERROR {}", format_error_chain(error)));
    }
}
