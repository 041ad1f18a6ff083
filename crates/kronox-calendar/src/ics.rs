//! Parser for the KronoX `.ics` export subset
//!
//! The export looks like RFC 5545 but only a narrow slice of it is ever
//! produced: `VEVENT` blocks whose `DTSTART`/`DTEND` are fixed-width UTC
//! stamps (`YYYYMMDDTHHMMSSZ`), a verbatim `LOCATION`, and a `SUMMARY`
//! carrying the bilingual field encoding handled by
//! [`crate::summary::tokenize_summary`]. Every other property is ignored.
//!
//! Long lines are folded: a raw line starting with a space or horizontal
//! tab continues the previous logical line. Folding is resolved before any
//! field is interpreted.
//!
//! Timestamps stay UTC while a record is open. When `END:VEVENT` closes the
//! record the parser converts once: the end instant is rebuilt on the
//! start's calendar date, both instants move to local time, and the week
//! number is computed from the *local* start so a booking late on a UTC
//! Sunday lands in the week its local wall clock says.

use crate::error::{CalendarError, Result};
use crate::event::Event;
use crate::summary::tokenize_summary;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use std::fs;
use std::path::Path;

/// Source name used in errors for text that did not come from a file
const INLINE_SOURCE: &str = "<input>";

/// Parse one KronoX `.ics` export from disk
///
/// # Errors
///
/// Returns an error if the file cannot be read, if a timestamp is malformed
/// or truncated, or if a record closes without a start time. Parse errors
/// name the file and the offending record.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| CalendarError::read_error(path, e))?;
    parse_source(&text, &path.display().to_string())
}

/// Parse calendar text already in memory
///
/// # Errors
///
/// Same parse failures as [`parse_file`]; errors name the record within the
/// given text.
///
/// # Examples
///
/// ```
/// use kronox_calendar::parse_str;
///
/// let events = parse_str(
///     "BEGIN:VEVENT\n\
///      DTSTART:20240902T071500Z\n\
///      DTEND:20240902T090000Z\n\
///      LOCATION:C203\n\
///      SUMMARY:Kurs.grp: CS101, Sign: AB Moment: Intro\n\
///      END:VEVENT\n",
/// )?;
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].course, "CS101");
/// # Ok::<(), kronox_calendar::CalendarError>(())
/// ```
pub fn parse_str(text: &str) -> Result<Vec<Event>> {
    parse_source(text, INLINE_SOURCE)
}

/// An event record that is open between `BEGIN:VEVENT` and `END:VEVENT`
struct PendingEvent {
    start_utc: Option<DateTime<Utc>>,
    /// End clock time in UTC; midnight when the record has no `DTEND:`
    end: NaiveTime,
    course: String,
    teacher: String,
    description: String,
    location: String,
    first_line: usize,
}

impl PendingEvent {
    fn new(first_line: usize) -> Self {
        Self {
            start_utc: None,
            end: NaiveTime::MIN,
            course: String::new(),
            teacher: String::new(),
            description: String::new(),
            location: String::new(),
            first_line,
        }
    }
}

fn parse_source(text: &str, source_name: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut pending: Option<PendingEvent> = None;
    let mut record = 0usize;

    for (line_no, line) in unfold(text) {
        if line.starts_with("BEGIN:VEVENT") {
            if pending.is_some() {
                log::debug!(
                    "{source_name}: line {line_no}: new record opened before the previous one closed"
                );
            }
            record += 1;
            pending = Some(PendingEvent::new(line_no));
            continue;
        }
        if line.starts_with("END:VEVENT") {
            if let Some(open) = pending.take() {
                events.push(finalize(open, line_no, source_name, record)?);
            }
            continue;
        }
        // Properties outside an open record are ignored, like every
        // property label the subset does not know.
        let Some(open) = pending.as_mut() else {
            continue;
        };
        if let Some(value) = line.strip_prefix("DTSTART:") {
            open.start_utc = Some(parse_timestamp(value, "DTSTART", source_name, record)?);
        } else if let Some(value) = line.strip_prefix("DTEND:") {
            open.end = parse_timestamp(value, "DTEND", source_name, record)?.time();
        } else if let Some(value) = line.strip_prefix("LOCATION:") {
            open.location = value.to_string();
        } else if let Some(value) = line.strip_prefix("SUMMARY:") {
            let fields = tokenize_summary(value);
            open.course = fields.course;
            open.teacher = fields.teacher;
            open.description = fields.description;
        }
    }

    if let Some(open) = pending {
        log::warn!(
            "{source_name}: dropping unterminated event record starting at line {}",
            open.first_line
        );
    }
    Ok(events)
}

/// Resolve line folding
///
/// Continuations are appended verbatim, their leading whitespace included.
/// Each logical line is returned with the 1-based number of its first raw
/// line.
fn unfold(text: &str) -> Vec<(usize, String)> {
    let mut logical: Vec<(usize, String)> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let continuation = raw.starts_with(' ') || raw.starts_with('\t');
        match logical.last_mut() {
            Some((_, line)) if continuation => line.push_str(raw),
            _ => logical.push((idx + 1, raw.to_string())),
        }
    }
    logical
}

/// Parse a fixed-width `YYYYMMDDTHHMMSSZ` stamp as UTC
///
/// Offsets are fixed: the layout is sliced, never scanned. Seconds are not
/// used by the schedule and are ignored.
fn parse_timestamp(
    value: &str,
    label: &'static str,
    source_name: &str,
    record: usize,
) -> Result<DateTime<Utc>> {
    let malformed = || CalendarError::MalformedTimestamp {
        source_name: source_name.to_string(),
        record,
        label,
        value: value.to_string(),
    };
    let year: i32 = slice_number(value, 0..4).ok_or_else(malformed)?;
    let month: u32 = slice_number(value, 4..6).ok_or_else(malformed)?;
    let day: u32 = slice_number(value, 6..8).ok_or_else(malformed)?;
    let hour: u32 = slice_number(value, 9..11).ok_or_else(malformed)?;
    let minute: u32 = slice_number(value, 11..13).ok_or_else(malformed)?;

    let invalid = || CalendarError::InvalidDateTime {
        source_name: source_name.to_string(),
        record,
        label,
        value: value.to_string(),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

/// Number parsed from a byte range of the stamp; `None` when the range
/// falls outside the value or holds non-digits
fn slice_number<T: std::str::FromStr>(value: &str, range: std::ops::Range<usize>) -> Option<T> {
    value.get(range)?.parse().ok()
}

/// Close a record: single UTC-to-local conversion and week computation
fn finalize(
    open: PendingEvent,
    end_line: usize,
    source_name: &str,
    record: usize,
) -> Result<Event> {
    let Some(start_utc) = open.start_utc else {
        return Err(CalendarError::MissingStart {
            source_name: source_name.to_string(),
            record,
            first_line: open.first_line,
            last_line: end_line,
        });
    };
    // The end shares the start's calendar date; only the clock time comes
    // from DTEND.
    let end_utc = Utc.from_utc_datetime(&start_utc.date_naive().and_time(open.end));
    let end_local = end_utc.with_timezone(&Local);
    let start_local = start_utc.with_timezone(&Local);
    Ok(Event {
        week: start_local.iso_week().week(),
        end_hour: end_local.hour(),
        end_min: end_local.minute(),
        start: start_local,
        course: open.course,
        teacher: open.teacher,
        description: open.description,
        location: open.location,
    })
}
