//! Whole-sheet assembly
//!
//! A sheet is a static header block followed by the schedule grid. The
//! header carries the title band, a short how-to section, the `Courses`
//! heading above the abbreviation rows, and the two reference cells every
//! passed-date formula compares against: `F1` (today) and `G1` (now).
//! [`Recalculation`] decides whether those two hold live formulas or the
//! frozen generation moment.

use crate::grid::{
    ScheduleGridBuilder, COL_DAY, COL_ENDED, COL_HELPER, NOW_CELL, TODAY_CELL,
};
use crate::sink::{CellRange, CellRef, CellValue, MemorySink, SpreadsheetSink, Style};
use crate::theme::Theme;
use chrono::Local;
use kronox_calendar::EventSet;
use std::fmt;
use std::str::FromStr;

/// Rows 0 through 12 belong to the header; the grid starts below
const HEADER_ROWS: u32 = 13;

/// How the today/now reference cells behave after generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Recalculation {
    /// `TODAY()`/`NOW()` formulas; passed rows gray out as time advances,
    /// whenever the spreadsheet application recalculates
    #[default]
    Live,
    /// The generation moment written as literals; the sheet never changes
    Frozen,
}

impl fmt::Display for Recalculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Frozen => write!(f, "frozen"),
        }
    }
}

impl FromStr for Recalculation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "frozen" => Ok(Self::Frozen),
            other => Err(format!("unknown recalculation mode: {other}")),
        }
    }
}

/// Builds one theme's complete sheet into a fresh cell buffer
#[must_use]
pub fn build_sheet(theme: &Theme, events: &EventSet, recalculation: Recalculation) -> MemorySink {
    let mut sink = MemorySink::new();
    write_header(&mut sink, theme, events, recalculation);
    ScheduleGridBuilder::new(&mut sink, theme).build(events);
    sink
}

/// Writes the header block into rows 0 through 12
pub fn write_header<S: SpreadsheetSink>(
    sink: &mut S,
    theme: &Theme,
    events: &EventSet,
    recalculation: Recalculation,
) {
    let base = Style::new()
        .with_fill(theme.fill_background)
        .with_font_color(theme.font_color_primary)
        .with_font_name(&theme.typeface_primary);
    sink.set_style(
        CellRange::new(CellRef::new(0, 0), CellRef::new(HEADER_ROWS - 1, COL_ENDED)),
        &base,
    );
    sink.set_style(
        CellRange::row_span(0, 0, COL_ENDED),
        &Style::new()
            .with_fill(theme.fill_header)
            .with_font_color(theme.font_color_header),
    );

    sink.set_value(CellRef::new(0, COL_DAY), CellValue::from("KronoX Schedule"));
    sink.set_style(
        CellRange::cell(CellRef::new(0, COL_DAY)),
        &Style::new().with_font_name(&theme.typeface_heading),
    );

    match recalculation {
        Recalculation::Live => {
            sink.set_formula(TODAY_CELL, "=TEXT(TODAY(),\"yyyy-mm-dd\")");
            sink.set_formula(NOW_CELL, "=TEXT(NOW(),\"HH:mm\")");
        }
        Recalculation::Frozen => {
            let now = Local::now();
            sink.set_value(TODAY_CELL, CellValue::from(now.format("%Y-%m-%d").to_string()));
            sink.set_value(NOW_CELL, CellValue::from(now.format("%H:%M").to_string()));
        }
    }

    let weeks = events.week_buckets().len();
    sink.set_value(
        CellRef::new(2, COL_DAY),
        CellValue::from(format!(
            "{} booking{} across {} week{}",
            events.len(),
            plural(events.len()),
            weeks,
            plural(weeks)
        )),
    );
    sink.set_style(
        CellRange::cell(CellRef::new(2, COL_DAY)),
        &Style::new().with_font_color(theme.font_color_secondary),
    );

    write_section(sink, theme, 4, "How it works");
    sink.set_value(
        CellRef::new(5, COL_DAY),
        CellValue::from("Events and days gray out once they have passed."),
    );
    sink.set_style(
        CellRange::cell(CellRef::new(5, COL_DAY)),
        &Style::new().with_font_color(theme.font_color_secondary),
    );
    sink.set_style(
        CellRange::row_span(6, COL_HELPER, COL_ENDED),
        &Style::new().with_border_bottom(theme.font_color_primary),
    );

    sink.set_value(
        CellRef::new(8, COL_DAY),
        CellValue::from("Times are local. Week numbers follow the ISO rule."),
    );
    sink.set_style(
        CellRange::cell(CellRef::new(8, COL_DAY)),
        &Style::new().with_font_color(theme.font_color_secondary),
    );

    write_section(sink, theme, 11, "Courses");
    sink.set_style(
        CellRange::row_span(11, COL_HELPER, COL_ENDED),
        &Style::new().with_border_bottom(theme.font_color_primary),
    );
}

fn write_section<S: SpreadsheetSink>(sink: &mut S, theme: &Theme, row: u32, heading: &str) {
    sink.set_value(CellRef::new(row, COL_DAY), CellValue::from(heading));
    sink.set_style(
        CellRange::cell(CellRef::new(row, COL_DAY)),
        &Style::new().with_font_name(&theme.typeface_heading),
    );
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use kronox_calendar::Event;

    fn sample_set() -> EventSet {
        let start = Local
            .with_ymd_and_hms(2024, 9, 2, 9, 0, 0)
            .single()
            .expect("daytime local timestamps are unambiguous");
        std::iter::once(Event {
            week: 36,
            end_hour: 10,
            end_min: 0,
            start,
            course: "CS101".to_string(),
            teacher: "AB".to_string(),
            description: "Lecture".to_string(),
            location: "C203".to_string(),
        })
        .collect()
    }

    // ==== RECALCULATION MODES ====

    #[test]
    fn test_live_mode_writes_today_and_now_formulas() {
        let mut sink = MemorySink::new();
        write_header(&mut sink, &Theme::dark(), &sample_set(), Recalculation::Live);
        let today = sink.cell(TODAY_CELL).expect("today cell");
        assert_eq!(today.formula.as_deref(), Some("=TEXT(TODAY(),\"yyyy-mm-dd\")"));
        let now = sink.cell(NOW_CELL).expect("now cell");
        assert_eq!(now.formula.as_deref(), Some("=TEXT(NOW(),\"HH:mm\")"));
    }

    #[test]
    fn test_frozen_mode_writes_parseable_literals() {
        let mut sink = MemorySink::new();
        write_header(&mut sink, &Theme::dark(), &sample_set(), Recalculation::Frozen);
        let today = sink.cell(TODAY_CELL).expect("today cell");
        assert!(today.formula.is_none());
        match today.value.as_ref().expect("today literal") {
            CellValue::Text(text) => {
                NaiveDate::parse_from_str(text, "%Y-%m-%d").expect("date literal parses");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_recalculation_round_trips_through_strings() {
        for mode in [Recalculation::Live, Recalculation::Frozen] {
            let parsed: Recalculation = mode.to_string().parse().expect("round trip");
            assert_eq!(parsed, mode);
        }
        assert!("hourly".parse::<Recalculation>().is_err());
        assert_eq!("FROZEN".parse::<Recalculation>(), Ok(Recalculation::Frozen));
    }

    // ==== HEADER CONTENT ====

    #[test]
    fn test_title_band_uses_header_colors() {
        let mut sink = MemorySink::new();
        let theme = Theme::dark();
        write_header(&mut sink, &theme, &sample_set(), Recalculation::Live);
        let title = sink.cell(CellRef::new(0, COL_DAY)).expect("title cell");
        assert_eq!(title.value, Some(CellValue::Text("KronoX Schedule".to_string())));
        assert_eq!(title.style.fill, Some(theme.fill_header));
        assert_eq!(title.style.font_color, Some(theme.font_color_header));
        assert_eq!(title.style.font_name.as_deref(), Some(theme.typeface_heading.as_str()));
    }

    #[test]
    fn test_summary_line_counts_bookings_and_weeks() {
        let mut sink = MemorySink::new();
        write_header(&mut sink, &Theme::dark(), &sample_set(), Recalculation::Live);
        let line = sink.cell(CellRef::new(2, COL_DAY)).expect("summary line");
        assert_eq!(
            line.value,
            Some(CellValue::Text("1 booking across 1 week".to_string()))
        );
    }

    #[test]
    fn test_courses_heading_sits_above_the_abbreviations() {
        let mut sink = MemorySink::new();
        write_header(&mut sink, &Theme::dark(), &sample_set(), Recalculation::Live);
        let heading = sink.cell(CellRef::new(11, COL_DAY)).expect("courses heading");
        assert_eq!(heading.value, Some(CellValue::Text("Courses".to_string())));
        let underline = sink.cell(CellRef::new(11, COL_HELPER)).expect("underline");
        assert_eq!(
            underline.style.border_bottom,
            Some(Theme::dark().font_color_primary)
        );
    }

    // ==== COMPOSITION ====

    #[test]
    fn test_build_sheet_stacks_header_and_grid() {
        let sink = build_sheet(&Theme::dark(), &sample_set(), Recalculation::Live);
        assert!(sink.cell(TODAY_CELL).is_some(), "header present");
        let week_abbrev = sink.cell(CellRef::new(13, COL_DAY)).expect("grid present");
        assert_eq!(week_abbrev.value, Some(CellValue::Text("w".to_string())));
        assert_eq!(sink.max_row(), Some(35), "one-course single-week extent");
    }
}
