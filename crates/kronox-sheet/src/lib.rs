//! # kronox-sheet
//!
//! Turns a parsed KronoX [`kronox_calendar::EventSet`] into a spreadsheet
//! schedule: a dense weekday grid with week blocks, per-course
//! abbreviations and colors, and formulas that gray out everything that
//! has already happened.
//!
//! The crate is layered:
//!
//! | Module    | Responsibility                                         |
//! |-----------|--------------------------------------------------------|
//! | [`sink`]  | The write interface the builder runs against           |
//! | [`theme`] | Colors and typefaces, built in or loaded from files    |
//! | [`grid`]  | Week-by-week schedule layout                           |
//! | [`sheet`] | Header block and whole-sheet assembly                  |
//! | [`xlsx`]  | Rendering buffered cells into an `.xlsx` workbook      |
//!
//! ## Quick start
//!
//! ```
//! use kronox_calendar::parse_str;
//! use kronox_sheet::{build_sheet, Recalculation, Theme, WorkbookRenderer};
//!
//! let events = parse_str(
//!     "BEGIN:VEVENT\n\
//!      DTSTART:20240902T071500Z\n\
//!      DTEND:20240902T090000Z\n\
//!      LOCATION:C203\n\
//!      SUMMARY:Kurs.grp: DA336A, Sign: ANDERS Moment: Föreläsning\n\
//!      END:VEVENT\n",
//! )?
//! .into_iter()
//! .collect();
//!
//! let theme = Theme::dark();
//! let sheet = build_sheet(&theme, &events, Recalculation::Live);
//!
//! let mut renderer = WorkbookRenderer::new();
//! renderer.add_sheet(&theme.name, &sheet)?;
//! let bytes = renderer.save_to_buffer()?;
//! assert!(bytes.starts_with(b"PK"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A sheet can also be built against any [`SpreadsheetSink`]
//! implementation, which is how the tests inspect layout without touching
//! workbook files.

pub mod error;
pub mod grid;
pub mod sheet;
pub mod sink;
pub mod theme;
pub mod xlsx;

pub use error::{Result, SheetError};
pub use grid::ScheduleGridBuilder;
pub use sheet::{build_sheet, write_header, Recalculation};
pub use sink::{CellRange, CellRef, CellValue, MemorySink, SpreadsheetSink, Style};
pub use theme::{Color, Theme};
pub use xlsx::WorkbookRenderer;
