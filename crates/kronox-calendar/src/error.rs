//! Error types for KronoX calendar parsing

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for calendar operations
pub type Result<T> = std::result::Result<T, CalendarError>;

/// Error type for parsing KronoX `.ics` exports
///
/// Parse errors carry the source name (a file path, or `<input>` for
/// in-memory text) and the 1-based index of the offending VEVENT record so
/// a user can locate the record in a multi-thousand-line export.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Failed to read calendar file from disk
    #[error("failed to read calendar file {path}: {source}")]
    ReadError {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A `DTSTART:` or `DTEND:` value is too short or not numeric
    ///
    /// The export uses fixed-width `YYYYMMDDTHHMMSSZ` stamps; anything that
    /// does not slice into digit groups at the expected offsets lands here.
    #[error("{source_name}: event {record}: malformed {label} timestamp {value:?}")]
    MalformedTimestamp {
        /// File path or `<input>` the text came from
        source_name: String,
        /// 1-based VEVENT record index within the source
        record: usize,
        /// The field label, `DTSTART` or `DTEND`
        label: &'static str,
        /// The raw timestamp value as it appeared
        value: String,
    },

    /// Timestamp digits sliced cleanly but name no real date or time
    #[error("{source_name}: event {record}: {label} {value:?} is not a valid UTC date-time")]
    InvalidDateTime {
        /// File path or `<input>` the text came from
        source_name: String,
        /// 1-based VEVENT record index within the source
        record: usize,
        /// The field label, `DTSTART` or `DTEND`
        label: &'static str,
        /// The raw timestamp value as it appeared
        value: String,
    },

    /// `END:VEVENT` was reached with no `DTSTART:` in the record
    ///
    /// A record without a start cannot be placed in the grid, and emitting a
    /// zero-valued event would silently corrupt the schedule.
    #[error(
        "{source_name}: event {record} (lines {first_line}-{last_line}) has no start time"
    )]
    MissingStart {
        /// File path or `<input>` the text came from
        source_name: String,
        /// 1-based VEVENT record index within the source
        record: usize,
        /// Line number of the record's `BEGIN:VEVENT`
        first_line: usize,
        /// Line number of the record's `END:VEVENT`
        last_line: usize,
    },
}

impl CalendarError {
    /// Create a read error
    #[inline]
    #[must_use = "returns CalendarError for file read failures"]
    pub fn read_error<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display_includes_path() {
        let err = CalendarError::read_error(
            "schedule.ics",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("schedule.ics"), "message was: {msg}");
        assert!(msg.contains("gone"), "message was: {msg}");
    }

    #[test]
    fn test_malformed_timestamp_names_record() {
        let err = CalendarError::MalformedTimestamp {
            source_name: "term1.ics".to_string(),
            record: 7,
            label: "DTSTART",
            value: "2024".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("term1.ics"), "message was: {msg}");
        assert!(msg.contains("event 7"), "message was: {msg}");
        assert!(msg.contains("DTSTART"), "message was: {msg}");
    }

    #[test]
    fn test_missing_start_reports_line_range() {
        let err = CalendarError::MissingStart {
            source_name: "term1.ics".to_string(),
            record: 2,
            first_line: 14,
            last_line: 19,
        };
        let msg = err.to_string();
        assert!(msg.contains("lines 14-19"), "message was: {msg}");
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CalendarError>();
    }
}
