//! I/O related utilities

use std::io::{Result, Write};

pub mod json;

/// Counts the number of octets that have been written
#[derive(Debug)]
pub struct CountingWrite<W> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> CountingWrite<W> {
    /// Wrap a writer and start counting
    pub const fn from_writer(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Dismantle the wrapped writer and stop counting
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for CountingWrite<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let bytes_written = self.writer.write(buf)?;
        self.bytes_written = self.bytes_written.saturating_add(bytes_written as u64);
        Ok(bytes_written)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }
}
