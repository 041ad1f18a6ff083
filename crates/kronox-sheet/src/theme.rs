//! Schedule color themes
//!
//! A theme is an immutable record of colors and typefaces, built once and
//! passed by reference into the grid builder. Two themes ship built in;
//! more can be loaded from plain-text files with one field per line:
//!
//! ```text
//! color fillHeader 22 27 34
//! string typefacePrimary Segoe UI
//! colors fillCourses 31 58 95, 61 46 79, 30 77 64
//! ```
//!
//! The first token is the field kind (`color`, `string`, `colors`), the
//! second the field name, and the remainder the value. Field names form a
//! closed table; anything unknown makes the whole file invalid, and an
//! invalid theme is skipped rather than half-applied.

use crate::error::{Result, SheetError};
use std::fs;
use std::path::Path;

/// An RGB color packed as `0xRRGGBB`
pub type Color = u32;

/// Colors and typefaces for one rendered schedule sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Display name, doubling as the sheet name
    pub name: String,

    /// Fill of the title row
    pub fill_header: Color,
    /// Fill of everything that is not schedule banding
    pub fill_background: Color,
    /// Banding fill for odd weekdays
    pub fill_schedule_light: Color,
    /// Banding fill for even weekdays
    pub fill_schedule_dark: Color,

    /// Font color on the title row
    pub font_color_header: Color,
    /// Default font color of the header block
    pub font_color_primary: Color,
    /// De-emphasized font color, also used for passed weeks
    pub font_color_secondary: Color,
    /// Font color of course abbreviations
    pub font_color_course: Color,
    /// Font color inside the schedule banding
    pub font_color_schedule: Color,
    /// Font color for events and days that have already ended
    pub font_color_ended: Color,

    /// Typeface for headings
    pub typeface_heading: String,
    /// Typeface for everything else
    pub typeface_primary: String,
    /// Identifier of the theme's button artwork, kept for theme files
    /// that still carry it
    pub update_button: String,

    /// Per-course fill palette, cycled in first-appearance order
    pub fill_courses: Vec<Color>,
}

impl Theme {
    /// True when the theme carries a course fill palette
    #[inline]
    #[must_use]
    pub fn has_course_colors(&self) -> bool {
        !self.fill_courses.is_empty()
    }

    /// The built-in dark theme
    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            fill_header: 0x161B22,
            fill_background: 0x0D1117,
            fill_schedule_light: 0x21262D,
            fill_schedule_dark: 0x161B22,
            font_color_header: 0xF0F6FC,
            font_color_primary: 0xC9D1D9,
            font_color_secondary: 0x8B949E,
            font_color_course: 0x58A6FF,
            font_color_schedule: 0xC9D1D9,
            font_color_ended: 0x484F58,
            typeface_heading: "Georgia".to_string(),
            typeface_primary: "Arial".to_string(),
            update_button: "dark.png".to_string(),
            fill_courses: vec![0x1F3A5F, 0x3D2E4F, 0x1E4D40, 0x5A3A1E, 0x4F2430, 0x2E4A57],
        }
    }

    /// The built-in light theme
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            fill_header: 0x2C3E50,
            fill_background: 0xFFFFFF,
            fill_schedule_light: 0xF4F6F8,
            fill_schedule_dark: 0xE8ECEF,
            font_color_header: 0xFFFFFF,
            font_color_primary: 0x1F2933,
            font_color_secondary: 0x7B8794,
            font_color_course: 0x1A73E8,
            font_color_schedule: 0x1F2933,
            font_color_ended: 0xB0B7BF,
            typeface_heading: "Georgia".to_string(),
            typeface_primary: "Arial".to_string(),
            update_button: "light.png".to_string(),
            fill_courses: vec![0xD6E4FF, 0xFFE3D6, 0xD8F5D0, 0xF5E6FA, 0xFFF2C2, 0xD0F0F5],
        }
    }

    /// All built-in themes
    #[must_use]
    pub fn builtin() -> Vec<Self> {
        vec![Self::dark(), Self::light()]
    }

    /// Parses theme text
    ///
    /// Fields not present in the text keep the dark theme's value, except
    /// the course palette which starts empty so that only themes naming a
    /// `fillCourses` line color their courses.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::ThemeParse`] on the first line that does not
    /// follow the format; no partially loaded theme is ever produced.
    pub fn from_str(name: &str, text: &str) -> Result<Self> {
        let mut theme = Self {
            name: name.to_string(),
            fill_courses: Vec::new(),
            ..Self::dark()
        };
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            theme
                .apply_line(line)
                .ok_or_else(|| SheetError::theme_parse(name, idx + 1, line))?;
        }
        Ok(theme)
    }

    /// Loads one theme file; the theme's name is the file stem
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::ThemeRead`] when the file cannot be read and
    /// [`SheetError::ThemeParse`] when a line does not follow the format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SheetError::theme_read(path, e))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "theme".to_string());
        let mut theme = Self::from_str(&name, &text);
        if let Err(SheetError::ThemeParse { path: p, .. }) = &mut theme {
            *p = path.to_path_buf();
        }
        theme
    }

    /// Loads every `.txt` theme in a directory, sorted by file name
    ///
    /// Files that fail to parse are skipped with a warning; the directory
    /// being unreadable is an error.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::ThemeRead`] when the directory itself cannot
    /// be listed.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Self>> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| SheetError::theme_read(dir, e))?;
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut themes = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::from_file(&path) {
                Ok(theme) => themes.push(theme),
                Err(err) => log::warn!("skipping theme {}: {err}", path.display()),
            }
        }
        Ok(themes)
    }

    /// Applies one `kind name value` line; `None` means the line is
    /// malformed
    fn apply_line(&mut self, line: &str) -> Option<()> {
        let (kind, rest) = line.split_once(' ')?;
        let (field, value) = rest.split_once(' ')?;
        match kind {
            "color" => {
                let color = parse_color(value)?;
                self.color_slot(field).map(|slot| *slot = color)
            }
            "string" => self.set_string(field, value),
            "colors" => {
                if field != "fillCourses" {
                    return None;
                }
                let palette: Option<Vec<Color>> = value.split(',').map(parse_color).collect();
                self.fill_courses = palette?;
                Some(())
            }
            _ => None,
        }
    }

    fn color_slot(&mut self, field: &str) -> Option<&mut Color> {
        Some(match field {
            "fillHeader" => &mut self.fill_header,
            "fillBackground" => &mut self.fill_background,
            "fillScheduleLight" => &mut self.fill_schedule_light,
            "fillScheduleDark" => &mut self.fill_schedule_dark,
            "fontColorHeader" => &mut self.font_color_header,
            "fontColorPrimary" => &mut self.font_color_primary,
            "fontColorSecondary" => &mut self.font_color_secondary,
            "fontColorCourse" => &mut self.font_color_course,
            "fontColorSchedule" => &mut self.font_color_schedule,
            "fontColorEnded" => &mut self.font_color_ended,
            _ => return None,
        })
    }

    fn set_string(&mut self, field: &str, value: &str) -> Option<()> {
        match field {
            "typefaceHeading" => self.typeface_heading = value.to_string(),
            "typefacePrimary" => self.typeface_primary = value.to_string(),
            "updateButton" => self.update_button = value.to_string(),
            _ => return None,
        }
        Some(())
    }
}

/// Parses `"R G B"` decimal components into a packed color
fn parse_color(value: &str) -> Option<Color> {
    let mut components = value.split_whitespace();
    let r: u32 = components.next()?.parse().ok()?;
    let g: u32 = components.next()?.parse().ok()?;
    let b: u32 = components.next()?.parse().ok()?;
    if components.next().is_some() || r > 255 || g > 255 || b > 255 {
        return None;
    }
    Some((r << 16) | (g << 8) | b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MIDNIGHT: &str = "color fillHeader 22 27 34\n\
        color fillBackground 13 17 23\n\
        color fillScheduleLight 33 38 45\n\
        color fillScheduleDark 22 27 34\n\
        color fontColorHeader 240 246 252\n\
        color fontColorPrimary 201 209 217\n\
        color fontColorSecondary 139 148 158\n\
        color fontColorCourse 88 166 255\n\
        color fontColorSchedule 201 209 217\n\
        color fontColorEnded 72 79 88\n\
        string typefaceHeading Playfair Display\n\
        string typefacePrimary Segoe UI\n\
        string updateButton midnight.png\n\
        colors fillCourses 31 58 95, 61 46 79, 30 77 64\n";

    // ==== PARSING ====

    #[test]
    fn test_full_theme_parses() {
        let theme = Theme::from_str("midnight", MIDNIGHT).expect("theme should parse");
        assert_eq!(theme.name, "midnight");
        assert_eq!(theme.fill_header, 0x161B22);
        assert_eq!(theme.font_color_ended, 0x484F58);
        assert_eq!(theme.fill_courses, vec![0x1F3A5F, 0x3D2E4F, 0x1E4D40]);
        assert!(theme.has_course_colors());
    }

    #[test]
    fn test_string_values_keep_inner_spaces() {
        let theme = Theme::from_str("midnight", MIDNIGHT).expect("theme should parse");
        assert_eq!(theme.typeface_heading, "Playfair Display");
        assert_eq!(theme.typeface_primary, "Segoe UI");
        assert_eq!(theme.update_button, "midnight.png");
    }

    #[test]
    fn test_palette_tolerates_spaces_around_commas() {
        let theme = Theme::from_str("t", "colors fillCourses 1 2 3 ,  4 5 6\n")
            .expect("padded palette should parse");
        assert_eq!(theme.fill_courses, vec![0x010203, 0x040506]);
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let theme =
            Theme::from_str("t", "\ncolor fillHeader 1 2 3\n\n").expect("theme should parse");
        assert_eq!(theme.fill_header, 0x010203);
    }

    #[test]
    fn test_omitted_fields_fall_back_to_dark() {
        let theme = Theme::from_str("t", "color fillHeader 0 0 0\n").expect("theme should parse");
        assert_eq!(theme.fill_background, Theme::dark().fill_background);
        assert_eq!(theme.typeface_primary, Theme::dark().typeface_primary);
    }

    #[test]
    fn test_file_theme_starts_without_course_palette() {
        let theme = Theme::from_str("t", "color fillHeader 0 0 0\n").expect("theme should parse");
        assert!(!theme.has_course_colors());
    }

    // ==== MALFORMED INPUT ====

    #[test]
    fn test_unknown_field_fails_the_theme() {
        let err = Theme::from_str("t", "color fillBorder 1 2 3\n")
            .expect_err("unknown field must fail");
        assert!(matches!(err, SheetError::ThemeParse { line_no: 1, .. }));
    }

    #[test]
    fn test_unknown_kind_fails_the_theme() {
        let err =
            Theme::from_str("t", "gradient fillHeader 1 2 3\n").expect_err("bad kind must fail");
        assert!(matches!(err, SheetError::ThemeParse { .. }));
    }

    #[test]
    fn test_short_color_fails_the_theme() {
        let err = Theme::from_str("t", "color fillHeader 1 2\n").expect_err("two components");
        assert!(matches!(err, SheetError::ThemeParse { .. }));
    }

    #[test]
    fn test_component_out_of_range_fails_the_theme() {
        let err = Theme::from_str("t", "color fillHeader 1 2 300\n").expect_err("300 > 255");
        assert!(matches!(err, SheetError::ThemeParse { .. }));
    }

    #[test]
    fn test_error_names_the_offending_line() {
        let text = "color fillHeader 1 2 3\nstring typefaceHeading\n";
        let err = Theme::from_str("t", text).expect_err("missing value must fail");
        match err {
            SheetError::ThemeParse { line_no, line, .. } => {
                assert_eq!(line_no, 2);
                assert_eq!(line, "string typefaceHeading");
            }
            other => panic!("expected ThemeParse, got {other:?}"),
        }
    }

    // ==== FILES ====

    #[test]
    fn test_from_file_names_theme_after_stem() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sunrise.txt");
        fs::write(&path, "color fillHeader 250 120 30\n").expect("write theme");
        let theme = Theme::from_file(&path).expect("theme should load");
        assert_eq!(theme.name, "sunrise");
        assert_eq!(theme.fill_header, 0xFA781E);
    }

    #[test]
    fn test_load_dir_skips_broken_themes() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("a.txt"), "color fillHeader 1 2 3\n").expect("write");
        fs::write(dir.path().join("b.txt"), "color whatIsThis 1 2 3\n").expect("write");
        fs::write(dir.path().join("notes.md"), "not a theme").expect("write");
        let themes = Theme::load_dir(dir.path()).expect("directory is readable");
        assert_eq!(themes.len(), 1, "only the valid .txt theme loads");
        assert_eq!(themes[0].name, "a");
    }

    #[test]
    fn test_load_dir_sorts_by_file_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in ["zebra.txt", "alpha.txt", "mid.txt"] {
            let mut file = fs::File::create(dir.path().join(name)).expect("create");
            file.write_all(b"color fillHeader 0 0 0\n").expect("write");
        }
        let themes = Theme::load_dir(dir.path()).expect("directory is readable");
        let names: Vec<&str> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["alpha", "mid", "zebra"]);
    }

    #[test]
    fn test_load_dir_missing_directory_is_an_error() {
        let err = Theme::load_dir("/nonexistent/themes").expect_err("missing dir must fail");
        assert!(matches!(err, SheetError::ThemeRead { .. }));
    }

    // ==== BUILT-INS ====

    #[test]
    fn test_builtin_themes_have_course_palettes() {
        for theme in Theme::builtin() {
            assert!(theme.has_course_colors(), "{} has no palette", theme.name);
            assert!(!theme.name.is_empty());
        }
    }

    #[test]
    fn test_builtin_names_are_distinct() {
        let themes = Theme::builtin();
        assert_eq!(themes[0].name, "Dark");
        assert_eq!(themes[1].name, "Light");
    }
}
