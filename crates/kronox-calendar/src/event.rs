//! The event record and the merged, sorted event collection

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One scheduled activity from a KronoX export
///
/// All time fields are local: the raw export carries UTC stamps, and the
/// parser converts exactly once when it finalizes the record. The end keeps
/// only a clock time because the export never schedules an activity across
/// midnight; the end shares the start's calendar date.
///
/// Two events are duplicates iff every field is equal. The same booking
/// exported into two files compares equal and is removed by
/// [`EventSet`] merging; a booking that differs in any field, even only its
/// location, is kept as a distinct event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Start of the activity, local time
    pub start: DateTime<Local>,
    /// Week number of `start`: first four-day week of the year, Monday start
    pub week: u32,
    /// Local end hour (0-23)
    pub end_hour: u32,
    /// Local end minute (0-59)
    pub end_min: u32,
    /// Course group code, e.g. `DA336A-20242-TS085-`
    pub course: String,
    /// Teacher signature
    pub teacher: String,
    /// Activity description (the export's "Moment")
    pub description: String,
    /// Room or campus location
    pub location: String,
}

impl Event {
    /// Weekday of the start, Monday = 0 through Sunday = 6
    #[inline]
    #[must_use]
    pub fn weekday_index(&self) -> u32 {
        self.start.weekday().num_days_from_monday()
    }

    /// Calendar date of the start
    #[inline]
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Events from every parsed file, deduplicated and sorted by start
///
/// Built once from the union of all parsed files. After construction the
/// only permitted mutation is [`EventSet::exclude_course`], applied before
/// the set is handed to the grid builder.
///
/// # Examples
///
/// ```
/// use kronox_calendar::{parse_str, EventSet};
///
/// let text = "BEGIN:VEVENT\nDTSTART:20240902T071500Z\nDTEND:20240902T090000Z\n\
///             LOCATION:C203\nSUMMARY:Kurs.grp: CS101, Sign: AB Moment: Intro\nEND:VEVENT\n";
/// let first = parse_str(text)?;
/// let second = parse_str(text)?;
///
/// // The same file parsed twice merges back to a single event.
/// let set = EventSet::merge([first, second]);
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.courses(), ["CS101"]);
/// # Ok::<(), kronox_calendar::CalendarError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventSet {
    events: Vec<Event>,
}

impl EventSet {
    /// Merge per-file event lists into one deduplicated, sorted set
    pub fn merge<I>(lists: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = Event>,
    {
        lists.into_iter().flatten().collect()
    }

    /// The events in ascending start order
    #[inline]
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events in the set
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the set holds no events
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Distinct course names, sorted lexicographically
    #[must_use]
    pub fn courses(&self) -> Vec<&str> {
        let mut courses: Vec<&str> = self.events.iter().map(|e| e.course.as_str()).collect();
        courses.sort_unstable();
        courses.dedup();
        courses
    }

    /// Remove every event belonging to `course`
    ///
    /// Sort order of the remaining events is unchanged.
    pub fn exclude_course(&mut self, course: &str) {
        self.events.retain(|e| e.course != course);
    }

    /// Contiguous runs of events sharing one week number
    ///
    /// This is a partition by run over the sorted sequence, not a grouping
    /// by value: it is only meaningful because the set is sorted by start.
    #[must_use]
    pub fn week_buckets(&self) -> Vec<&[Event]> {
        self.events.chunk_by(|a, b| a.week == b.week).collect()
    }

    /// Iterate the events in ascending start order
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl FromIterator<Event> for EventSet {
    /// Collects events, drops exact duplicates keeping the first occurrence,
    /// and stable-sorts ascending by start.
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        let mut events: Vec<Event> = iter.into_iter().collect();
        // Equal events are not necessarily adjacent after sorting by start
        // alone, so dedup by identity before ordering.
        let mut seen = HashSet::new();
        events.retain(|e| seen.insert(e.clone()));
        events.sort_by_key(|e| e.start);
        Self { events }
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Builds an event with the week derived from the start, as the parser
    /// would have produced it.
    fn event(y: i32, mo: u32, d: u32, h: u32, mi: u32, course: &str) -> Event {
        let start = Local
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .expect("test wall-clock time should be unambiguous");
        Event {
            start,
            week: start.iso_week().week(),
            end_hour: h + 2,
            end_min: mi,
            course: course.to_string(),
            teacher: "AB".to_string(),
            description: "Lecture".to_string(),
            location: "C203".to_string(),
        }
    }

    // ==== MERGE / DEDUP / SORT ====

    #[test]
    fn test_merge_sorts_by_start() {
        let set = EventSet::merge([vec![
            event(2024, 9, 4, 10, 15, "CS101"),
            event(2024, 9, 2, 8, 15, "CS101"),
            event(2024, 9, 3, 13, 15, "MA110"),
        ]]);
        let starts: Vec<u32> = set.iter().map(|e| e.start.day()).collect();
        assert_eq!(starts, [2, 3, 4], "events should come out in start order");
    }

    #[test]
    fn test_merge_removes_exact_duplicates_across_lists() {
        let a = vec![event(2024, 9, 2, 8, 15, "CS101"), event(2024, 9, 3, 8, 15, "CS101")];
        let b = vec![event(2024, 9, 2, 8, 15, "CS101")];
        let set = EventSet::merge([a, b]);
        assert_eq!(set.len(), 2, "the repeated booking should collapse to one");
    }

    #[test]
    fn test_merge_dedup_handles_interleaved_equal_starts() {
        // Two identical events separated by a different event with the very
        // same start: the duplicates are not adjacent after sorting.
        let dup = event(2024, 9, 2, 8, 15, "CS101");
        let other = event(2024, 9, 2, 8, 15, "MA110");
        let set = EventSet::merge([vec![dup.clone(), other], vec![dup]]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_near_duplicates_are_both_kept() {
        let a = event(2024, 9, 2, 8, 15, "CS101");
        let mut b = a.clone();
        b.location = "B118".to_string();
        let set = EventSet::merge([vec![a, b]]);
        assert_eq!(set.len(), 2, "a single differing field must not dedup");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let list = vec![event(2024, 9, 2, 8, 15, "CS101"), event(2024, 9, 3, 8, 15, "MA110")];
        let once = EventSet::merge([list.clone()]);
        let twice = EventSet::merge([list.clone(), list]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_stable_order_for_equal_starts() {
        let a = event(2024, 9, 2, 8, 15, "CS101");
        let b = event(2024, 9, 2, 8, 15, "MA110");
        let set = EventSet::merge([vec![a.clone(), b.clone()]]);
        assert_eq!(set.events()[0], a);
        assert_eq!(set.events()[1], b);
    }

    // ==== COURSES ====

    #[test]
    fn test_courses_sorted_distinct() {
        let set = EventSet::merge([vec![
            event(2024, 9, 2, 8, 15, "MA110"),
            event(2024, 9, 2, 10, 15, "CS101"),
            event(2024, 9, 3, 8, 15, "MA110"),
        ]]);
        assert_eq!(set.courses(), ["CS101", "MA110"]);
    }

    #[test]
    fn test_exclude_course_removes_all_records() {
        let mut set = EventSet::merge([vec![
            event(2024, 9, 2, 8, 15, "MA110"),
            event(2024, 9, 2, 10, 15, "CS101"),
            event(2024, 9, 3, 8, 15, "MA110"),
        ]]);
        set.exclude_course("MA110");
        assert_eq!(set.len(), 1);
        assert_eq!(set.courses(), ["CS101"]);
    }

    #[test]
    fn test_exclude_unknown_course_is_a_no_op() {
        let mut set = EventSet::merge([vec![event(2024, 9, 2, 8, 15, "CS101")]]);
        set.exclude_course("PH100");
        assert_eq!(set.len(), 1);
    }

    // ==== WEEK BUCKETS ====

    #[test]
    fn test_week_buckets_split_on_week_change() {
        let set = EventSet::merge([vec![
            event(2024, 9, 2, 8, 15, "CS101"),  // week 36
            event(2024, 9, 4, 8, 15, "CS101"),  // week 36
            event(2024, 9, 9, 8, 15, "CS101"),  // week 37
            event(2024, 9, 10, 8, 15, "CS101"), // week 37
            event(2024, 9, 11, 8, 15, "CS101"), // week 37
        ]]);
        let buckets = set.week_buckets();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].len(), 2);
        assert_eq!(buckets[1].len(), 3);
        assert!(
            buckets[1].iter().all(|e| e.week == buckets[1][0].week),
            "every event in a bucket shares the week number"
        );
    }

    #[test]
    fn test_week_buckets_empty_set() {
        let set = EventSet::default();
        assert!(set.week_buckets().is_empty());
    }

    #[test]
    fn test_week_buckets_single_event() {
        let set = EventSet::merge([vec![event(2024, 9, 2, 8, 15, "CS101")]]);
        assert_eq!(set.week_buckets().len(), 1);
    }

    // ==== EVENT ACCESSORS ====

    #[test]
    fn test_weekday_index_monday_is_zero() {
        // 2024-09-02 is a Monday, 2024-09-06 a Friday.
        assert_eq!(event(2024, 9, 2, 8, 0, "CS101").weekday_index(), 0);
        assert_eq!(event(2024, 9, 6, 8, 0, "CS101").weekday_index(), 4);
    }

    #[test]
    fn test_week_matches_iso_rule() {
        // 2026-01-01 is a Thursday, so it belongs to week 1 under the
        // first-four-day-week rule.
        assert_eq!(event(2026, 1, 1, 8, 0, "CS101").week, 1);
        // 2027-01-01 is a Friday, so it still belongs to the old year's
        // last week, 53.
        assert_eq!(event(2027, 1, 1, 8, 0, "CS101").week, 53);
    }
}
