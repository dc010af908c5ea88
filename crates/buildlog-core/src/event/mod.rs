//! Build events as delivered by the build engine

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub mod format;

pub type VerbosityValue = u8;

#[derive(Debug)]
pub struct VerbosityValues;

impl VerbosityValues {
    pub const QUIET: VerbosityValue = 0;
    pub const MINIMAL: VerbosityValue = 1;
    pub const NORMAL: VerbosityValue = 2;
    pub const DETAILED: VerbosityValue = 3;
}

/// The amount of detail that should be admitted into the log.
///
/// Variants are ordered by "at least as verbose as", i.e.
/// `Quiet < Minimal < Normal < Detailed`.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Verbosity {
    Quiet = VerbosityValues::QUIET as isize,

    Minimal = VerbosityValues::MINIMAL as isize,

    #[default]
    Normal = VerbosityValues::NORMAL as isize,

    Detailed = VerbosityValues::DETAILED as isize,
}

impl Verbosity {
    pub const ALL: [Self; 4] = [Self::Quiet, Self::Minimal, Self::Normal, Self::Detailed];

    #[must_use]
    pub const fn value(self) -> VerbosityValue {
        self as VerbosityValue
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Minimal => "minimal",
            Self::Normal => "normal",
            Self::Detailed => "detailed",
        }
    }
}

impl From<Verbosity> for VerbosityValue {
    fn from(from: Verbosity) -> Self {
        from.value()
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum TryFromVerbosityValueError {
    #[error("invalid value {0}")]
    InvalidValue(VerbosityValue),
}

impl TryFrom<VerbosityValue> for Verbosity {
    type Error = TryFromVerbosityValueError;

    fn try_from(from: VerbosityValue) -> Result<Self, Self::Error> {
        match from {
            VerbosityValues::QUIET => Ok(Self::Quiet),
            VerbosityValues::MINIMAL => Ok(Self::Minimal),
            VerbosityValues::NORMAL => Ok(Self::Normal),
            VerbosityValues::DETAILED => Ok(Self::Detailed),
            _ => Err(TryFromVerbosityValueError::InvalidValue(from)),
        }
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
#[error("unknown verbosity \"{0}\"")]
pub struct ParseVerbosityError(pub String);

impl FromStr for Verbosity {
    type Err = ParseVerbosityError;

    /// Accepts full names and their single letter abbreviations,
    /// ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" | "quiet" => Ok(Self::Quiet),
            "m" | "minimal" => Ok(Self::Minimal),
            "n" | "normal" => Ok(Self::Normal),
            "d" | "detailed" => Ok(Self::Detailed),
            _ => Err(ParseVerbosityError(s.to_owned())),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a message, independent of the configured verbosity
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Importance {
    High,
    Normal,
    Low,
}

/// Discriminator of [`EventRecord`]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EventKind {
    ProjectStarted,
    ProjectFinished,
    TaskStarted,
    TaskFinished,
    Message,
    Warning,
    Error,
    Other,
}

impl EventKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProjectStarted => "ProjectStarted",
            Self::ProjectFinished => "ProjectFinished",
            Self::TaskStarted => "TaskStarted",
            Self::TaskFinished => "TaskFinished",
            Self::Message => "Message",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Other => "Other",
        }
    }

    /// Warnings and errors
    #[must_use]
    pub const fn is_diagnostic(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }

    /// Start and finish of projects and tasks
    #[must_use]
    pub const fn is_lifecycle(self) -> bool {
        matches!(
            self,
            Self::ProjectStarted | Self::ProjectFinished | Self::TaskStarted | Self::TaskFinished
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields shared by all build events
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventHeader {
    /// Name of the component that raised the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// Human-readable text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

impl EventHeader {
    #[must_use]
    pub fn new(sender_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender_name: Some(sender_name.into()),
            message: Some(message.into()),
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectStarted {
    #[serde(flatten)]
    pub header: EventHeader,

    pub project_file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_names: Option<String>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectFinished {
    #[serde(flatten)]
    pub header: EventHeader,

    pub project_file: String,

    pub succeeded: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskStarted {
    #[serde(flatten)]
    pub header: EventHeader,

    pub task_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_file: Option<String>,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskFinished {
    #[serde(flatten)]
    pub header: EventHeader,

    pub task_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_file: Option<String>,

    pub succeeded: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    #[serde(flatten)]
    pub header: EventHeader,

    /// Missing for messages that have not been classified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
}

/// Payload of both warnings and errors
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Diagnostic {
    #[serde(flatten)]
    pub header: EventHeader,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    pub line_number: u32,

    pub column_number: u32,

    #[serde(default)]
    pub end_line_number: u32,

    #[serde(default)]
    pub end_column_number: u32,
}

/// Any event the engine raises that has no dedicated variant
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Other {
    #[serde(flatten)]
    pub header: EventHeader,

    /// The engine's own name for the event, e.g. `BuildStarted`
    pub event_type: String,
}

/// A single build event
///
/// Serialized externally tagged, i.e. as an object whose single key
/// is the name of the [`EventKind`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventRecord {
    ProjectStarted(ProjectStarted),
    ProjectFinished(ProjectFinished),
    TaskStarted(TaskStarted),
    TaskFinished(TaskFinished),
    Message(Message),
    Warning(Diagnostic),
    Error(Diagnostic),
    Other(Other),
}

impl EventRecord {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ProjectStarted(_) => EventKind::ProjectStarted,
            Self::ProjectFinished(_) => EventKind::ProjectFinished,
            Self::TaskStarted(_) => EventKind::TaskStarted,
            Self::TaskFinished(_) => EventKind::TaskFinished,
            Self::Message(_) => EventKind::Message,
            Self::Warning(_) => EventKind::Warning,
            Self::Error(_) => EventKind::Error,
            Self::Other(_) => EventKind::Other,
        }
    }

    #[must_use]
    pub fn header(&self) -> &EventHeader {
        match self {
            Self::ProjectStarted(ProjectStarted { header, .. })
            | Self::ProjectFinished(ProjectFinished { header, .. })
            | Self::TaskStarted(TaskStarted { header, .. })
            | Self::TaskFinished(TaskFinished { header, .. })
            | Self::Message(Message { header, .. })
            | Self::Warning(Diagnostic { header, .. })
            | Self::Error(Diagnostic { header, .. })
            | Self::Other(Other { header, .. }) => header,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.header().message.as_deref()
    }

    /// Only messages carry an importance
    #[must_use]
    pub fn importance(&self) -> Option<Importance> {
        match self {
            Self::Message(Message { importance, .. }) => *importance,
            _ => None,
        }
    }

    /// The name under which the event appears in the log
    ///
    /// Same as the kind name, except for [`EventRecord::Other`]
    /// which reports the engine's own event type.
    #[must_use]
    pub fn event_type(&self) -> &str {
        match self {
            Self::Other(Other { event_type, .. }) => event_type,
            _ => self.kind().name(),
        }
    }

    #[must_use]
    pub fn message_with_importance(
        header: EventHeader,
        importance: impl Into<Option<Importance>>,
    ) -> Self {
        Self::Message(Message {
            header,
            importance: importance.into(),
        })
    }
}
