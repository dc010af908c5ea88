use std::{
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use buildlog_core::{
    diagnostics::Diagnostics,
    event::format::RecordFormat,
    filter::{EventFilter, FilterPolicy},
    io::json::{JsonArrayFileWriter, WriterState},
    EventKind, EventRecord, Verbosity,
};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum State {
    Inactive,
    Active,
    Terminated,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Config {
    pub verbosity: Verbosity,
    pub filter_policy: FilterPolicy,
    pub record_format: RecordFormat,
}

impl Config {
    #[must_use]
    pub const fn event_filter(&self) -> EventFilter {
        EventFilter::new(self.verbosity, self.filter_policy)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Status {
    pub state: State,
    pub output_path: Option<PathBuf>,
    pub elements_written: u64,
    pub bytes_written: u64,

    /// Events that have not been admitted by the filter
    pub events_rejected: u64,

    /// Admitted events that could not be written
    pub events_dropped: u64,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ElementWritten(pub EventKind);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EventNotRecorded {
    Rejected,
}

pub type RecordEventOutcome = StdResult<ElementWritten, EventNotRecorded>;

#[derive(Debug)]
pub(crate) struct Context {
    config: Config,

    state: State,

    output_path: Option<PathBuf>,

    writer: JsonArrayFileWriter,

    diagnostics: Box<dyn Diagnostics + Send>,

    events_rejected: u64,

    events_dropped: u64,
}

impl Context {
    pub(crate) fn new(config: Config, diagnostics: Box<dyn Diagnostics + Send>) -> Self {
        Self {
            config,
            state: State::Inactive,
            output_path: None,
            writer: JsonArrayFileWriter::new(),
            diagnostics,
            events_rejected: 0,
            events_dropped: 0,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    pub(crate) fn status(&self) -> Status {
        Status {
            state: self.state,
            output_path: self.output_path.clone(),
            elements_written: self.writer.elements_written(),
            bytes_written: self.writer.bytes_written(),
            events_rejected: self.events_rejected,
            events_dropped: self.events_dropped,
        }
    }

    /// Open the log file and start accepting events
    pub(crate) fn activate(&mut self, output_path: &Path) -> Result<()> {
        if self.state != State::Inactive {
            return Err(Error::InvalidState);
        }
        if let Err(err) = self.writer.open_file(output_path) {
            self.diagnostics.write_exception(&err);
            return Err(err.into());
        }
        log::debug!(
            "Logging build events into {} with {:?}",
            output_path.display(),
            self.config
        );
        self.diagnostics.write_message(&format!(
            "Logging build events into {} (verbosity = {}, filter = {}, format = {})",
            output_path.display(),
            self.config.verbosity,
            self.config.filter_policy,
            self.config.record_format,
        ));
        self.output_path = Some(output_path.to_path_buf());
        self.state = State::Active;
        Ok(())
    }

    pub(crate) fn record_event(&mut self, event: &EventRecord) -> Result<RecordEventOutcome> {
        if self.state != State::Active {
            log::error!(
                "Received {} event while {:?}",
                event.kind(),
                self.state
            );
            return Err(Error::InvalidState);
        }
        if !self.config.event_filter().admits(event) {
            self.events_rejected += 1;
            return Ok(Err(EventNotRecorded::Rejected));
        }
        let element = self.config.record_format.format(event);
        let elements_before = self.writer.elements_written();
        if let Err(err) = self.writer.append_element(&element) {
            // Failed flushes are reported but the element has been written
            if self.writer.elements_written() == elements_before {
                self.events_dropped += 1;
            }
            self.diagnostics.write_exception(&err);
            return Err(err.into());
        }
        Ok(Ok(ElementWritten(event.kind())))
    }

    /// Close the log file
    ///
    /// Terminating an already terminated context has no effect.
    pub(crate) fn terminate(&mut self) -> Result<()> {
        if self.state == State::Terminated {
            debug_assert_eq!(WriterState::Closed, self.writer.state());
            return Ok(());
        }
        log::debug!("Switching state: {:?} -> {:?}", self.state, State::Terminated);
        let last_state = std::mem::replace(&mut self.state, State::Terminated);
        let closed = self.writer.close();
        match &closed {
            Ok(()) if last_state == State::Inactive => {
                // Nothing has been logged
            }
            Ok(()) => {
                self.diagnostics.write_message(&format!(
                    "Closed log with {} element(s), {} event(s) rejected, {} event(s) dropped",
                    self.writer.elements_written(),
                    self.events_rejected,
                    self.events_dropped,
                ));
            }
            Err(err) => {
                self.diagnostics.write_exception(err);
            }
        }
        closed.map_err(Into::into)
    }
}
