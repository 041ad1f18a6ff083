//! # kronox-calendar
//!
//! Parser for schedule exports from the KronoX academic booking system.
//!
//! KronoX hands students an `.ics` file that looks like RFC 5545 but uses
//! only a tiny slice of it, and it packs the interesting fields into the
//! `SUMMARY` property with bilingual labels. This crate turns such an
//! export into plain [`Event`] values and collects them into an
//! [`EventSet`] that merges several exports, removes duplicates, and
//! groups bookings by week.
//!
//! ## Input format
//!
//! Each booking is a `BEGIN:VEVENT` / `END:VEVENT` block. Within a block
//! the parser reads four properties and ignores everything else:
//!
//! | Property    | Meaning                                              |
//! |-------------|------------------------------------------------------|
//! | `DTSTART:`  | Start instant, fixed-width `YYYYMMDDTHHMMSSZ` in UTC |
//! | `DTEND:`    | End instant, same layout; only the clock time is used |
//! | `LOCATION:` | Room or building, taken verbatim                     |
//! | `SUMMARY:`  | Labeled fields, see below                            |
//!
//! The `SUMMARY` value carries up to five fields behind Swedish or English
//! labels, which may appear in either language within one export:
//!
//! | Field       | Swedish label | English label  |
//! |-------------|---------------|----------------|
//! | course      | `Kurs.grp: `  | `Coursegrp: `  |
//! | teacher     | `Sign: `      | `Sign: `       |
//! | description | `Moment: `    | `Description: `|
//! | resource    | `Hjälpm.: `   | `Resourse: `   |
//! | programme   | `Program: `   | `Programme: `  |
//!
//! A field's value runs from its label to the nearest following label of
//! either language, or to the end of the line. The course field is
//! additionally cut at the first comma.
//!
//! ## Quick start
//!
//! ```
//! use kronox_calendar::{parse_str, EventSet};
//!
//! let ics = "BEGIN:VEVENT\n\
//!     DTSTART:20240902T071500Z\n\
//!     DTEND:20240902T090000Z\n\
//!     LOCATION:C203\n\
//!     SUMMARY:Kurs.grp: DA336A, Sign: ANDERS Moment: Föreläsning\n\
//!     END:VEVENT\n";
//!
//! let set: EventSet = parse_str(ics)?.into_iter().collect();
//! assert_eq!(set.len(), 1);
//! assert_eq!(set.courses(), ["DA336A"]);
//! # Ok::<(), kronox_calendar::CalendarError>(())
//! ```
//!
//! Merging a whole directory of exports works the same way; duplicated
//! bookings that appear in overlapping exports collapse to one event:
//!
//! ```
//! use kronox_calendar::{parse_str, EventSet};
//!
//! let ics = "BEGIN:VEVENT\n\
//!     DTSTART:20240902T071500Z\n\
//!     DTEND:20240902T090000Z\n\
//!     SUMMARY:Kurs.grp: DA336A, Sign: ANDERS\n\
//!     END:VEVENT\n";
//!
//! let first = parse_str(ics)?;
//! let second = parse_str(ics)?;
//! let set = EventSet::merge([first, second]);
//! assert_eq!(set.len(), 1);
//! # Ok::<(), kronox_calendar::CalendarError>(())
//! ```

pub mod error;
pub mod event;
pub mod ics;
pub mod summary;

pub use error::{CalendarError, Result};
pub use event::{Event, EventSet};
pub use ics::{parse_file, parse_str};
pub use summary::{tokenize_summary, SummaryFields};
