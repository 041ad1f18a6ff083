//! Schedule grid construction
//!
//! [`ScheduleGridBuilder`] lays a parsed [`EventSet`] out as a row-oriented
//! grid: one block per week, one row per weekday Monday through Friday,
//! weekend rows only when a booking actually falls on one. The grid is
//! dense; weekdays without bookings still get a dated row.
//!
//! Layout within a row uses fixed columns. `C` and `K` hold helper
//! formulas whose font matches the fill so they stay invisible, `D`/`E`
//! carry the day name and number, `F` the time range, `G` a formula
//! reference to the course's abbreviation row, and `I`/`J` description and
//! location. Cell `F1` holds today's date and `G1` the current time;
//! every "has this passed" formula compares against those two.
//!
//! Formulas and conditional formats are not written during the walk. They
//! accumulate in banks and are applied in one bulk pass once the layout is
//! final, which keeps per-cell recalculation out of the hot loop.

use crate::sink::{CellRange, CellRef, CellValue, SpreadsheetSink, Style};
use crate::theme::Theme;
use chrono::{Datelike, Duration, NaiveDate};
use kronox_calendar::{Event, EventSet};
use std::collections::{HashMap, HashSet};

/// Cell holding today's date, compared against by every date formula
pub const TODAY_CELL: CellRef = CellRef::new(0, 5);
/// Cell holding the current time, compared against by end-time formulas
pub const NOW_CELL: CellRef = CellRef::new(0, 6);

/// First abbreviation row; renders as row 14 in formula references
pub const ABBREVIATION_START_ROW: u32 = 13;

pub(crate) const COL_HELPER: u16 = 2; // C
pub(crate) const COL_DAY: u16 = 3; // D
pub(crate) const COL_DAY_NUMBER: u16 = 4; // E
pub(crate) const COL_TIME: u16 = 5; // F
pub(crate) const COL_COURSE: u16 = 6; // G
pub(crate) const COL_DESCRIPTION: u16 = 8; // I
pub(crate) const COL_LOCATION: u16 = 9; // J
pub(crate) const COL_ENDED: u16 = 10; // K

const FRIDAY: u32 = 4;
const TRAILING_BLANK_ROWS: u32 = 10;

/// Single-shot builder writing one schedule grid through a sink
///
/// The builder owns the row cursor, the course abbreviation and palette
/// maps, and the three deferred banks. All of it is private to one build;
/// a new sheet starts from a fresh builder.
pub struct ScheduleGridBuilder<'a, S: SpreadsheetSink> {
    sink: &'a mut S,
    theme: &'a Theme,
    /// Row currently being composed
    row: u32,
    week_cell: CellRef,
    abbreviation_cells: HashMap<String, CellRef>,
    course_colors: HashMap<String, usize>,
    formulas: Vec<(CellRef, String)>,
    date_event_formats: Vec<(CellRange, String)>,
    week_formats: Vec<(CellRange, String)>,
}

impl<'a, S: SpreadsheetSink> ScheduleGridBuilder<'a, S> {
    pub fn new(sink: &'a mut S, theme: &'a Theme) -> Self {
        Self {
            sink,
            theme,
            row: ABBREVIATION_START_ROW,
            week_cell: CellRef::new(ABBREVIATION_START_ROW, COL_DAY),
            abbreviation_cells: HashMap::new(),
            course_colors: HashMap::new(),
            formulas: Vec::new(),
            date_event_formats: Vec::new(),
            week_formats: Vec::new(),
        }
    }

    /// Lays out the whole grid and applies the deferred banks
    pub fn build(mut self, events: &EventSet) {
        self.write_abbreviations(events);
        self.insert_blank_row();
        self.write_section_heading("Schedule");
        self.insert_blank_row();
        for bucket in events.week_buckets() {
            self.write_week(bucket);
        }
        self.flush_banks();
        for _ in 0..TRAILING_BLANK_ROWS {
            self.insert_blank_row();
        }
    }

    /// One row per distinct course, first-appearance order, preceded by
    /// the `w`/`Week` entry the week labels reference
    fn write_abbreviations(&mut self, events: &EventSet) {
        self.week_cell = CellRef::new(self.row, COL_DAY);
        self.write_abbreviation("w", "Week");
        let mut seen: HashSet<&str> = HashSet::new();
        for event in events {
            if !seen.insert(event.course.as_str()) {
                continue;
            }
            let abbreviation: String = event.course.chars().take(5).collect();
            self.course_colors
                .insert(event.course.clone(), self.course_colors.len());
            self.write_abbreviation(abbreviation.trim_end(), &event.course);
        }
    }

    fn write_abbreviation(&mut self, abbreviation: &str, full_name: &str) {
        self.sink.insert_rows(self.row, 1);
        self.style_blank_row();
        let at = CellRef::new(self.row, COL_DAY);
        self.sink.set_value(at, CellValue::from(abbreviation));
        self.sink.set_style(
            CellRange::cell(at),
            &Style::new().with_font_color(self.theme.font_color_course),
        );
        let full = CellRef::new(self.row, COL_TIME);
        self.sink.set_value(full, CellValue::from(full_name));
        self.sink.set_style(
            CellRange::cell(full),
            &Style::new().with_font_color(self.theme.font_color_secondary),
        );
        self.abbreviation_cells.insert(full_name.to_string(), at);
        self.row += 1;
    }

    fn write_week(&mut self, bucket: &[Event]) {
        self.insert_blank_row();
        self.write_week_label(bucket);

        let mut expected = 0u32;
        let mut last_date: Option<NaiveDate> = None;
        let mut date_row = self.row;
        let mut index = 0;
        while index < bucket.len() {
            let event = &bucket[index];
            let day = event.weekday_index();
            if day > expected {
                self.write_gap_day(event, expected);
                expected += 1;
                continue;
            }

            self.insert_weekday_row(day);
            if last_date != Some(event.date()) {
                self.write_date_label(event.date());
                self.register_date_format(event.date());
                date_row = self.row;
                last_date = Some(event.date());
            }
            self.write_event(event, date_row);
            self.row += 1;

            let last_of_day = bucket
                .get(index + 1)
                .map_or(true, |next| next.date() != event.date());
            if last_of_day {
                expected += 1;
            }
            index += 1;
        }

        // Dense through Friday even when the last booking is mid-week.
        // These rows carry no passed-date format, matching the gap rows
        // only in content.
        if let Some(last) = bucket.last() {
            while expected <= FRIDAY {
                self.insert_weekday_row(expected);
                let delta = i64::from(expected) - i64::from(last.weekday_index());
                self.write_date_label(last.date() + Duration::days(delta));
                self.row += 1;
                expected += 1;
            }
        }

        self.insert_blank_row();
    }

    /// The week-label row: `w36` built by formula from the week
    /// abbreviation cell, plus the month name of the week's Monday
    fn write_week_label(&mut self, bucket: &[Event]) {
        self.sink.insert_rows(self.row, 1);
        self.style_blank_row();
        let first = &bucket[0];
        let monday = first.date() - Duration::days(i64::from(first.weekday_index()));

        self.sink.set_formula(
            CellRef::new(self.row, COL_DAY),
            &format!("={}&{}", self.week_cell.a1(), first.week),
        );
        // Day 29*month of the spreadsheet epoch always lands in `month`,
        // so TEXT can render a localized month name without a date literal.
        self.sink.set_formula(
            CellRef::new(self.row, COL_DAY_NUMBER),
            &format!("=PROPER(TEXT({}*29,\"MMMM\"))", monday.month()),
        );

        let helper = CellRef::new(self.row, COL_HELPER);
        self.sink.set_style(
            CellRange::cell(helper),
            &Style::new().with_font_color(self.theme.fill_background),
        );
        let sunday = monday + Duration::days(6);
        self.formulas.push((
            helper,
            format!(
                "=DATEVALUE(\"{}\")<DATEVALUE({})",
                sunday.format("%Y-%m-%d"),
                TODAY_CELL.a1()
            ),
        ));
        self.week_formats.push((
            CellRange::row_span(self.row, COL_DAY, COL_DAY_NUMBER),
            format!("={}", helper.a1()),
        ));
        self.row += 1;
    }

    /// A dated row for a weekday the schedule skips over
    fn write_gap_day(&mut self, event: &Event, expected: u32) {
        self.insert_weekday_row(expected);
        let delta = i64::from(event.weekday_index() - expected);
        let date = event.date() - Duration::days(delta);
        self.write_date_label(date);
        self.register_date_format(date);
        self.row += 1;
    }

    fn write_date_label(&mut self, date: NaiveDate) {
        self.sink.set_formula(
            CellRef::new(self.row, COL_DAY),
            &format!(
                "=PROPER(TEXT(DATEVALUE(\"{}\"),\"DDD\"))",
                date.format("%Y-%m-%d")
            ),
        );
        self.sink.set_value(
            CellRef::new(self.row, COL_DAY_NUMBER),
            CellValue::from(date.day()),
        );
    }

    /// Banks the passed-date helper for the current row and the format it
    /// triggers on the day cells
    fn register_date_format(&mut self, date: NaiveDate) {
        let helper = CellRef::new(self.row, COL_HELPER);
        self.formulas.push((
            helper,
            format!(
                "=DATEVALUE(\"{}\")<DATEVALUE({})",
                date.format("%Y-%m-%d"),
                TODAY_CELL.a1()
            ),
        ));
        self.date_event_formats.push((
            CellRange::row_span(self.row, COL_DAY, COL_DAY_NUMBER),
            format!("={}", helper.a1()),
        ));
    }

    fn write_event(&mut self, event: &Event, date_row: u32) {
        let time = format!(
            "{} - {:02}:{:02}",
            event.start.format("%H:%M"),
            event.end_hour,
            event.end_min
        );
        self.sink
            .set_value(CellRef::new(self.row, COL_TIME), CellValue::from(time));
        self.sink.set_value(
            CellRef::new(self.row, COL_DESCRIPTION),
            CellValue::from(event.description.as_str()),
        );
        self.sink.set_value(
            CellRef::new(self.row, COL_LOCATION),
            CellValue::from(event.location.as_str()),
        );

        let course_cell = CellRef::new(self.row, COL_COURSE);
        if let Some(abbreviation) = self.abbreviation_cells.get(&event.course) {
            self.sink
                .set_formula(course_cell, &format!("={}", abbreviation.a1()));
        }
        if self.theme.has_course_colors() {
            if let Some(&index) = self.course_colors.get(&event.course) {
                let fill = self.theme.fill_courses[index % self.theme.fill_courses.len()];
                self.sink
                    .set_style(CellRange::cell(course_cell), &Style::new().with_fill(fill));
            }
        }

        // Ended when the date row's helper is true, or the booking is
        // today and its end time is behind the clock.
        let helper = CellRef::new(self.row, COL_ENDED);
        self.formulas.push((
            helper,
            format!(
                "=OR({},AND(DATEVALUE(\"{}\")=DATEVALUE({}),TIMEVALUE(\"{:02}:{:02}\")<TIMEVALUE({})))",
                CellRef::new(date_row, COL_HELPER).a1(),
                event.date().format("%Y-%m-%d"),
                TODAY_CELL.a1(),
                event.end_hour,
                event.end_min,
                NOW_CELL.a1()
            ),
        ));
        let trigger = format!("={}", helper.a1());
        self.date_event_formats.push((
            CellRange::cell(CellRef::new(self.row, COL_TIME)),
            trigger.clone(),
        ));
        self.date_event_formats.push((
            CellRange::row_span(self.row, COL_DESCRIPTION, COL_LOCATION),
            trigger,
        ));
    }

    /// Inserts the current row and paints the weekday banding; helper
    /// columns get their font matched to the fill
    fn insert_weekday_row(&mut self, day: u32) {
        self.sink.insert_rows(self.row, 1);
        let band = if day % 2 == 0 {
            self.theme.fill_schedule_dark
        } else {
            self.theme.fill_schedule_light
        };
        self.sink.set_style(
            CellRange::row_span(self.row, COL_HELPER, COL_ENDED),
            &Style::new().with_fill(band),
        );
        for helper_col in [COL_HELPER, COL_ENDED] {
            self.sink.set_style(
                CellRange::cell(CellRef::new(self.row, helper_col)),
                &Style::new().with_font_color(band),
            );
        }
        self.sink.set_style(
            CellRange::row_span(self.row, COL_DAY, COL_TIME),
            &Style::new().with_font_color(self.theme.font_color_schedule),
        );
        self.sink.set_style(
            CellRange::row_span(self.row, COL_DESCRIPTION, COL_LOCATION),
            &Style::new().with_font_color(self.theme.font_color_schedule),
        );
        self.sink.set_style(
            CellRange::cell(CellRef::new(self.row, COL_COURSE)),
            &Style::new().with_font_color(self.theme.font_color_course),
        );
    }

    fn write_section_heading(&mut self, text: &str) {
        self.sink.insert_rows(self.row, 1);
        self.style_blank_row();
        let at = CellRef::new(self.row, COL_DAY);
        self.sink.set_value(at, CellValue::from(text));
        self.sink.set_style(
            CellRange::cell(at),
            &Style::new()
                .with_font_name(&self.theme.typeface_heading)
                .with_font_color(self.theme.font_color_primary),
        );
        self.sink.set_style(
            CellRange::row_span(self.row, COL_HELPER, COL_ENDED),
            &Style::new().with_border_bottom(self.theme.font_color_primary),
        );
        self.row += 1;
    }

    fn insert_blank_row(&mut self) {
        self.sink.insert_rows(self.row, 1);
        self.style_blank_row();
        self.row += 1;
    }

    fn style_blank_row(&mut self) {
        self.sink.set_style(
            CellRange::row_span(self.row, COL_HELPER, COL_ENDED),
            &Style::new().with_fill(self.theme.fill_background),
        );
    }

    /// Applies the banked formulas and conditional formats in bulk
    fn flush_banks(&mut self) {
        for (at, formula) in std::mem::take(&mut self.formulas) {
            self.sink.set_formula(at, &formula);
        }
        let ended = Style::new().with_font_color(self.theme.font_color_ended);
        for (range, trigger) in std::mem::take(&mut self.date_event_formats) {
            self.sink.add_conditional_format(range, &trigger, &ended);
        }
        let secondary = Style::new().with_font_color(self.theme.font_color_secondary);
        for (range, trigger) in std::mem::take(&mut self.week_formats) {
            self.sink.add_conditional_format(range, &trigger, &secondary);
        }
    }
}
