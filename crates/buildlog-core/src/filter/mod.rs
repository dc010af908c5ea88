//! Admission of events into the log

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::event::{EventKind, EventRecord, Importance, Verbosity};

/// Decide if an event is admitted at the given verbosity
///
/// Only warnings, errors and messages are considered. Warnings
/// and errors are always admitted, messages depending on their
/// importance. All other kinds are rejected.
#[must_use]
pub fn should_admit(verbosity: Verbosity, record: &EventRecord) -> bool {
    match record.kind() {
        EventKind::Warning | EventKind::Error => true,
        EventKind::Message => admits_message(verbosity, record.importance()),
        EventKind::ProjectStarted
        | EventKind::ProjectFinished
        | EventKind::TaskStarted
        | EventKind::TaskFinished
        | EventKind::Other => false,
    }
}

fn admits_message(verbosity: Verbosity, importance: Option<Importance>) -> bool {
    if verbosity >= Verbosity::Detailed {
        // Unclassified messages included
        return true;
    }
    match importance {
        Some(Importance::High) => verbosity >= Verbosity::Minimal,
        Some(Importance::Normal) => verbosity >= Verbosity::Normal,
        Some(Importance::Low) | None => false,
    }
}

/// Which event kinds participate in the log
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum FilterPolicy {
    /// Warnings, errors and messages filtered by verbosity
    #[default]
    DiagnosticsOnly,

    /// Like [`FilterPolicy::DiagnosticsOnly`] plus the start and finish
    /// of all projects and tasks, regardless of verbosity
    DiagnosticsAndLifecycle,

    /// Every event, regardless of verbosity
    Everything,
}

impl FilterPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiagnosticsOnly => "diagnostics-only",
            Self::DiagnosticsAndLifecycle => "diagnostics-and-lifecycle",
            Self::Everything => "everything",
        }
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
#[error("unknown filter policy \"{0}\"")]
pub struct ParseFilterPolicyError(pub String);

impl FromStr for FilterPolicy {
    type Err = ParseFilterPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diagnostics-only" => Ok(Self::DiagnosticsOnly),
            "diagnostics-and-lifecycle" => Ok(Self::DiagnosticsAndLifecycle),
            "everything" => Ok(Self::Everything),
            _ => Err(ParseFilterPolicyError(s.to_owned())),
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct EventFilter {
    pub verbosity: Verbosity,
    pub policy: FilterPolicy,
}

impl EventFilter {
    #[must_use]
    pub const fn new(verbosity: Verbosity, policy: FilterPolicy) -> Self {
        Self { verbosity, policy }
    }

    #[must_use]
    pub fn admits(&self, record: &EventRecord) -> bool {
        let Self { verbosity, policy } = *self;
        match policy {
            FilterPolicy::DiagnosticsOnly => should_admit(verbosity, record),
            FilterPolicy::DiagnosticsAndLifecycle => {
                record.kind().is_lifecycle() || should_admit(verbosity, record)
            }
            FilterPolicy::Everything => true,
        }
    }
}
