//! Tokenizer for the export's `SUMMARY:` line
//!
//! KronoX packs several fields into one summary value as `Label: value`
//! segments, and labels the segments in Swedish or English depending on how
//! the export was requested. Segments can appear in any order and any of
//! them can be missing, so a value is bounded by the nearest following label
//! of *any* field rather than by the next field in table order.

/// Swedish and English labels for one summary field
#[derive(Debug, Clone, Copy)]
struct LabelPair {
    sv: &'static str,
    en: &'static str,
}

const COURSE: LabelPair = LabelPair {
    sv: "Kurs.grp: ",
    en: "Coursegrp: ",
};
const SIGN: LabelPair = LabelPair {
    sv: "Sign: ",
    en: "Sign: ",
};
const DESCRIPTION: LabelPair = LabelPair {
    sv: "Moment: ",
    en: "Description: ",
};
// "Resourse" is the export's own spelling.
const RESOURCE: LabelPair = LabelPair {
    sv: "Hjälpm.: ",
    en: "Resourse: ",
};
const PROGRAMME: LabelPair = LabelPair {
    sv: "Program: ",
    en: "Programme: ",
};

/// Every label literal, in both languages; any of these terminates the
/// value of the preceding segment.
const ALL_LABELS: [&str; 9] = [
    "Kurs.grp: ",
    "Coursegrp: ",
    "Sign: ",
    "Moment: ",
    "Description: ",
    "Hjälpm.: ",
    "Resourse: ",
    "Program: ",
    "Programme: ",
];

/// Fields of one tokenized summary line
///
/// A field whose label is absent from the line is the empty string. Only
/// `course`, `teacher` and `description` reach the schedule grid; the
/// resource and programme segments are extracted for completeness and
/// mainly matter as value terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFields {
    /// Course group code; comma-terminated in the export on top of the
    /// label rule
    pub course: String,
    /// Teacher signature
    pub teacher: String,
    /// Activity description
    pub description: String,
    /// Booked resource or aid
    pub resource: String,
    /// Programme the activity belongs to
    pub programme: String,
}

/// Tokenize a summary value (the text after `SUMMARY:`)
///
/// # Examples
///
/// ```
/// use kronox_calendar::tokenize_summary;
///
/// let fields = tokenize_summary("Kurs.grp: CS101, Sign: AB Moment: Lecture 1 Program: BSc");
/// assert_eq!(fields.course, "CS101");
/// assert_eq!(fields.teacher, "AB");
/// assert_eq!(fields.description, "Lecture 1");
/// assert_eq!(fields.programme, "BSc");
/// ```
#[must_use]
pub fn tokenize_summary(line: &str) -> SummaryFields {
    SummaryFields {
        course: extract_course(line),
        teacher: extract(line, SIGN),
        description: extract(line, DESCRIPTION),
        resource: extract(line, RESOURCE),
        programme: extract(line, PROGRAMME),
    }
}

/// Extract one field's value: the text between the field's label (either
/// language, whichever occurs first) and the nearest following occurrence
/// of any label, or end of line. Trailing whitespace that merely separated
/// the value from the next label is not part of the value.
fn extract(line: &str, field: LabelPair) -> String {
    let Some(value_start) = position_after_label(line, field) else {
        return String::new();
    };
    let rest = &line[value_start..];
    let value_end = ALL_LABELS
        .iter()
        .filter_map(|label| rest.find(label))
        .min()
        .unwrap_or(rest.len());
    rest[..value_end].trim_end().to_string()
}

/// The course group value is additionally terminated by the first comma.
fn extract_course(line: &str) -> String {
    let value = extract(line, COURSE);
    match value.find(',') {
        Some(comma) => value[..comma].trim_end().to_string(),
        None => value,
    }
}

/// Byte offset just past the earliest occurrence of either label literal
fn position_after_label(line: &str, field: LabelPair) -> Option<usize> {
    let mut earliest: Option<(usize, usize)> = None;
    for label in [field.sv, field.en] {
        if let Some(at) = line.find(label) {
            if earliest.map_or(true, |(start, _)| at < start) {
                earliest = Some((at, at + label.len()));
            }
        }
    }
    earliest.map(|(_, value_start)| value_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== CANONICAL ORDER ====

    #[test]
    fn test_swedish_labels_canonical_order() {
        let fields = tokenize_summary(
            "Kurs.grp: DA336A-20242-TS085-, Sign: ANDERS Moment: Föreläsning Program: TGSYA21h",
        );
        assert_eq!(fields.course, "DA336A-20242-TS085-");
        assert_eq!(fields.teacher, "ANDERS");
        assert_eq!(fields.description, "Föreläsning");
        assert_eq!(fields.programme, "TGSYA21h");
        assert_eq!(fields.resource, "", "no resource segment in the line");
    }

    #[test]
    fn test_english_labels_canonical_order() {
        let fields = tokenize_summary(
            "Coursegrp: DA336A-20242-TS085-, Sign: ANDERS Description: Lecture Programme: TGSYA21h",
        );
        assert_eq!(fields.course, "DA336A-20242-TS085-");
        assert_eq!(fields.teacher, "ANDERS");
        assert_eq!(fields.description, "Lecture");
        assert_eq!(fields.programme, "TGSYA21h");
    }

    #[test]
    fn test_swedish_and_english_extract_identically() {
        let sv = tokenize_summary("Kurs.grp: CS101, Sign: AB Moment: Lab 2 Hjälpm.: Laptop");
        let en = tokenize_summary("Coursegrp: CS101, Sign: AB Description: Lab 2 Resourse: Laptop");
        assert_eq!(sv.course, en.course);
        assert_eq!(sv.teacher, en.teacher);
        assert_eq!(sv.description, en.description);
        assert_eq!(sv.resource, en.resource);
    }

    // ==== ORDER TOLERANCE ====

    #[test]
    fn test_programme_before_course_group() {
        let fields = tokenize_summary("Program: BSc Kurs.grp: CS101, Sign: AB Moment: Lecture");
        assert_eq!(fields.programme, "BSc");
        assert_eq!(fields.course, "CS101");
        assert_eq!(fields.teacher, "AB");
        assert_eq!(fields.description, "Lecture");
    }

    #[test]
    fn test_value_bounded_by_nearest_label_not_table_order() {
        // Sign is followed by Program, not by Moment; the teacher value must
        // stop at Program all the same.
        let fields = tokenize_summary("Sign: AB Program: BSc Moment: Lecture");
        assert_eq!(fields.teacher, "AB");
        assert_eq!(fields.description, "Lecture");
    }

    // ==== MISSING SEGMENTS ====

    #[test]
    fn test_absent_label_yields_empty_string() {
        let fields = tokenize_summary("Moment: Tentamen");
        assert_eq!(fields.course, "");
        assert_eq!(fields.teacher, "");
        assert_eq!(fields.description, "Tentamen");
    }

    #[test]
    fn test_empty_line_yields_all_empty() {
        assert_eq!(tokenize_summary(""), SummaryFields::default());
    }

    #[test]
    fn test_value_runs_to_end_of_line_without_following_label() {
        let fields = tokenize_summary("Kurs.grp: CS101, Sign: AB Moment: Guest lecture on parsing");
        assert_eq!(fields.description, "Guest lecture on parsing");
    }

    // ==== COURSE COMMA RULE ====

    #[test]
    fn test_course_value_stops_at_comma() {
        let fields = tokenize_summary("Kurs.grp: CS101, CS102, Sign: AB");
        assert_eq!(fields.course, "CS101");
    }

    #[test]
    fn test_course_without_comma_uses_label_bound() {
        let fields = tokenize_summary("Kurs.grp: CS101 Sign: AB");
        assert_eq!(fields.course, "CS101");
    }

    // ==== BOUNDARY DETAILS ====

    #[test]
    fn test_programme_label_is_not_mistaken_for_program() {
        // "Programme: " must not terminate at a bare "Program" prefix scan.
        let fields = tokenize_summary("Sign: AB Programme: MSc");
        assert_eq!(fields.teacher, "AB");
        assert_eq!(fields.programme, "MSc");
    }

    #[test]
    fn test_multi_word_values_keep_interior_spaces() {
        let fields =
            tokenize_summary("Kurs.grp: CS101, Sign: AB CD Moment: Project kick off Program: BSc");
        assert_eq!(fields.teacher, "AB CD");
        assert_eq!(fields.description, "Project kick off");
    }

    #[test]
    fn test_value_containing_label_text_is_cut_there() {
        // A description that happens to contain a label literal is cut at
        // that point; the format is ambiguous and the nearest-label rule is
        // the documented resolution.
        let fields = tokenize_summary("Moment: Review of Sign: conventions");
        assert_eq!(fields.description, "Review of");
        assert_eq!(fields.teacher, "conventions");
    }
}
