use std::path::PathBuf;

use buildlog_core::EventKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Lifecycle(LifecycleEvent),
    Incident(IncidentEvent),
}

/// Common lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Started { output_path: PathBuf },
    Stopped { elements_written: u64 },
}

/// Unexpected incidents that might require (manual) intervention
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentEvent {
    ElementDropped {
        kind: EventKind,
        reason: String,
    },
    IoWriteError {
        os_code: Option<i32>,
        message: String,
    },
}
