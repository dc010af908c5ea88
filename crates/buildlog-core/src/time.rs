//! Time related structs
use std::{fmt, time::SystemTime};

use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, UtcOffset,
};

// Nanosecond precision prevents name clashes between files that
// are created in quick succession.
// Format: YYYYMMDDThhmmss.nnnnnnnnn
const FILE_NAME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second].[subsecond digits:9]");

/// A point in time with the offset of the local time zone
///
/// Falls back to UTC if the local offset cannot be determined.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    #[must_use]
    pub const fn to_inner(self) -> OffsetDateTime {
        self.0
    }

    /// Format suitable for the name of a file
    #[must_use]
    pub fn format_file_name(&self) -> String {
        // The format only contains numeric components
        self.0
            .format(FILE_NAME_FORMAT)
            .unwrap_or_else(|_| self.0.unix_timestamp_nanos().to_string())
    }

    #[must_use]
    pub fn format_rfc3339(&self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp_nanos().to_string())
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(from: OffsetDateTime) -> Self {
        Self(from)
    }
}

impl From<Timestamp> for OffsetDateTime {
    fn from(from: Timestamp) -> Self {
        from.to_inner()
    }
}

impl From<SystemTime> for Timestamp {
    fn from(from: SystemTime) -> Self {
        let utc = OffsetDateTime::from(from);
        let offset = UtcOffset::local_offset_at(utc).unwrap_or(UtcOffset::UTC);
        Self(utc.to_offset(offset))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}
