//! Layout of log elements

use std::{fmt, str::FromStr};

use serde::{ser::SerializeStruct as _, Serialize, Serializer};
use thiserror::Error;

use super::EventRecord;

/// How a single [`EventRecord`] is laid out as an array element
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum RecordFormat {
    /// `{ "<KindName>": { ... } }`
    #[default]
    Tagged,

    /// `{ "EventType": "<KindName>", "Message": "...", "Payload": { ... } }`
    Flat,
}

impl RecordFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tagged => "tagged",
            Self::Flat => "flat",
        }
    }

    #[must_use]
    pub fn format(self, record: &EventRecord) -> FormattedRecord<'_> {
        FormattedRecord {
            format: self,
            record,
        }
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
#[error("unknown record format \"{0}\"")]
pub struct ParseRecordFormatError(pub String);

impl FromStr for RecordFormat {
    type Err = ParseRecordFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tagged" => Ok(Self::Tagged),
            "flat" => Ok(Self::Flat),
            _ => Err(ParseRecordFormatError(s.to_owned())),
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrows a record for serialization in the chosen layout
#[derive(Debug, Clone, Copy)]
pub struct FormattedRecord<'a> {
    format: RecordFormat,
    record: &'a EventRecord,
}

impl Serialize for FormattedRecord<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Self { format, record } = self;
        match format {
            RecordFormat::Tagged => record.serialize(serializer),
            RecordFormat::Flat => {
                let mut state = serializer.serialize_struct("Event", 3)?;
                state.serialize_field("EventType", record.event_type())?;
                state.serialize_field("Message", &record.message())?;
                state.serialize_field("Payload", &Payload(record))?;
                state.end()
            }
        }
    }
}

/// The variant's fields without the enclosing tag
struct Payload<'a>(&'a EventRecord);

impl Serialize for Payload<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            EventRecord::ProjectStarted(inner) => inner.serialize(serializer),
            EventRecord::ProjectFinished(inner) => inner.serialize(serializer),
            EventRecord::TaskStarted(inner) => inner.serialize(serializer),
            EventRecord::TaskFinished(inner) => inner.serialize(serializer),
            EventRecord::Message(inner) => inner.serialize(serializer),
            EventRecord::Warning(inner) | EventRecord::Error(inner) => inner.serialize(serializer),
            EventRecord::Other(inner) => inner.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::event::{EventHeader, Importance, Other, TaskFinished};

    use super::*;

    #[test]
    fn tagged_format_uses_kind_name_as_key() {
        let record = EventRecord::TaskFinished(TaskFinished {
            header: EventHeader::new("Engine", "Done building task \"Copy\"."),
            task_name: "Copy".to_owned(),
            project_file: None,
            succeeded: true,
        });
        assert_eq!(
            json!({
                "TaskFinished": {
                    "SenderName": "Engine",
                    "Message": "Done building task \"Copy\".",
                    "TaskName": "Copy",
                    "Succeeded": true,
                }
            }),
            serde_json::to_value(RecordFormat::Tagged.format(&record)).unwrap()
        );
    }

    #[test]
    fn flat_format_lifts_type_and_message() {
        let record =
            EventRecord::message_with_importance(EventHeader::new("Exec", "hi"), Importance::Low);
        assert_eq!(
            json!({
                "EventType": "Message",
                "Message": "hi",
                "Payload": {
                    "SenderName": "Exec",
                    "Message": "hi",
                    "Importance": "Low",
                }
            }),
            serde_json::to_value(RecordFormat::Flat.format(&record)).unwrap()
        );
    }

    #[test]
    fn flat_format_of_other_event_without_message() {
        let record = EventRecord::Other(Other {
            header: EventHeader::default(),
            event_type: "BuildStarted".to_owned(),
        });
        assert_eq!(
            json!({
                "EventType": "BuildStarted",
                "Message": null,
                "Payload": {
                    "EventType": "BuildStarted",
                }
            }),
            serde_json::to_value(RecordFormat::Flat.format(&record)).unwrap()
        );
    }

    #[test]
    fn parse_record_format() {
        assert_eq!(Ok(RecordFormat::Tagged), "tagged".parse());
        assert_eq!(Ok(RecordFormat::Flat), "Flat".parse());
        assert!("csv".parse::<RecordFormat>().is_err());
    }
}
