// Re-export internal types that are used in the public API
pub use crate::internal::context::{
    Config, ElementWritten, EventNotRecorded, RecordEventOutcome, State, Status,
};

pub mod logger;
pub use self::logger::JsonEventLogger;

pub mod event;
pub use self::event::Event;
