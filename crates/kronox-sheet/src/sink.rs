//! Spreadsheet sink abstraction
//!
//! The grid builder writes through [`SpreadsheetSink`] and never touches a
//! workbook library directly. Everything it needs is five operations:
//! values, formulas, styles, row insertion, and conditional formats.
//! [`MemorySink`] implements the trait as a plain cell buffer, which is
//! what the xlsx renderer consumes and what the tests inspect.
//!
//! Addresses are 0-based row and column grid coordinates. A1-style
//! references appear only inside formula text, rendered by
//! [`CellRef::a1`].

use crate::theme::Color;
use std::collections::BTreeMap;

/// A single cell address, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
}

impl CellRef {
    #[inline]
    #[must_use]
    pub const fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// A1-style reference, e.g. row 13 column 3 renders as `D14`
    #[must_use]
    pub fn a1(&self) -> String {
        format!("{}{}", column_letter(self.col), self.row + 1)
    }
}

/// An inclusive rectangular cell range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    #[inline]
    #[must_use]
    pub const fn new(first: CellRef, last: CellRef) -> Self {
        Self { first, last }
    }

    /// Range covering a single cell
    #[inline]
    #[must_use]
    pub const fn cell(at: CellRef) -> Self {
        Self {
            first: at,
            last: at,
        }
    }

    /// A span of columns within one row
    #[inline]
    #[must_use]
    pub const fn row_span(row: u32, first_col: u16, last_col: u16) -> Self {
        Self {
            first: CellRef::new(row, first_col),
            last: CellRef::new(row, last_col),
        }
    }

    /// A1-style reference, `C7:K7` for spans and `D14` for single cells
    #[must_use]
    pub fn a1(&self) -> String {
        if self.first == self.last {
            self.first.a1()
        } else {
            format!("{}:{}", self.first.a1(), self.last.a1())
        }
    }

    #[must_use]
    pub fn contains(&self, at: CellRef) -> bool {
        (self.first.row..=self.last.row).contains(&at.row)
            && (self.first.col..=self.last.col).contains(&at.col)
    }
}

/// Spreadsheet column letters for a 0-based index: 0 is `A`, 25 is `Z`,
/// 26 is `AA`
#[must_use]
pub fn column_letter(col: u16) -> String {
    let mut col = u32::from(col);
    let mut letters: Vec<u8> = Vec::with_capacity(2);
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A literal cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for CellValue {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<u32> for CellValue {
    fn from(number: u32) -> Self {
        Self::Number(f64::from(number))
    }
}

/// A partial style; unset fields leave the cell's current style untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub font_color: Option<Color>,
    pub font_name: Option<String>,
    pub border_bottom: Option<Color>,
}

impl Style {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "returns a style with the fill set"]
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    #[must_use = "returns a style with the font color set"]
    pub fn with_font_color(mut self, color: Color) -> Self {
        self.font_color = Some(color);
        self
    }

    #[must_use = "returns a style with the font name set"]
    pub fn with_font_name(mut self, name: &str) -> Self {
        self.font_name = Some(name.to_string());
        self
    }

    #[must_use = "returns a style with the bottom border set"]
    pub fn with_border_bottom(mut self, color: Color) -> Self {
        self.border_bottom = Some(color);
        self
    }

    /// Overlays `other` onto `self`; only `other`'s set fields win
    pub fn merge_from(&mut self, other: &Style) {
        if let Some(fill) = other.fill {
            self.fill = Some(fill);
        }
        if let Some(font_color) = other.font_color {
            self.font_color = Some(font_color);
        }
        if let Some(name) = &other.font_name {
            self.font_name = Some(name.clone());
        }
        if let Some(border) = other.border_bottom {
            self.border_bottom = Some(border);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fill.is_none()
            && self.font_color.is_none()
            && self.font_name.is_none()
            && self.border_bottom.is_none()
    }
}

/// Write interface the grid builder runs against
///
/// All operations are in-memory and infallible; persisting the result is
/// the renderer's job. Implementations are single-writer for the duration
/// of one build.
pub trait SpreadsheetSink {
    /// Writes a literal value, replacing any previous value at the address
    fn set_value(&mut self, at: CellRef, value: CellValue);

    /// Writes a formula, given with its leading `=`
    fn set_formula(&mut self, at: CellRef, formula: &str);

    /// Applies a partial style to every cell of the range
    fn set_style(&mut self, range: CellRange, style: &Style);

    /// Inserts `count` empty rows before `at_row`, shifting everything at
    /// or below it down
    fn insert_rows(&mut self, at_row: u32, count: u32);

    /// Registers a conditional format: `style` applies to the range while
    /// `trigger` (a formula with its leading `=`) evaluates true
    fn add_conditional_format(&mut self, range: CellRange, trigger: &str, style: &Style);
}

/// Buffered cell state as the renderer and the tests see it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub formula: Option<String>,
    pub style: Style,
}

/// A registered conditional format
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormat {
    pub range: CellRange,
    pub trigger: String,
    pub style: Style,
}

/// Cell buffer implementing [`SpreadsheetSink`]
///
/// Keys are `(row, col)` so iteration is row-major, which is the order the
/// renderer wants.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    cells: BTreeMap<(u32, u16), Cell>,
    conditional_formats: Vec<ConditionalFormat>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell at an address, if anything was written there
    #[must_use]
    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&(at.row, at.col))
    }

    /// All written cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellRef::new(row, col), cell))
    }

    #[must_use]
    pub fn conditional_formats(&self) -> &[ConditionalFormat] {
        &self.conditional_formats
    }

    /// Highest row index holding any cell
    #[must_use]
    pub fn max_row(&self) -> Option<u32> {
        self.cells.keys().next_back().map(|&(row, _)| row)
    }

    fn cell_mut(&mut self, at: CellRef) -> &mut Cell {
        self.cells.entry((at.row, at.col)).or_default()
    }
}

impl SpreadsheetSink for MemorySink {
    fn set_value(&mut self, at: CellRef, value: CellValue) {
        self.cell_mut(at).value = Some(value);
    }

    fn set_formula(&mut self, at: CellRef, formula: &str) {
        self.cell_mut(at).formula = Some(formula.to_string());
    }

    fn set_style(&mut self, range: CellRange, style: &Style) {
        for row in range.first.row..=range.last.row {
            for col in range.first.col..=range.last.col {
                self.cell_mut(CellRef::new(row, col)).style.merge_from(style);
            }
        }
    }

    fn insert_rows(&mut self, at_row: u32, count: u32) {
        if count == 0 {
            return;
        }
        let shifted: Vec<((u32, u16), Cell)> = self
            .cells
            .split_off(&(at_row, 0))
            .into_iter()
            .map(|((row, col), cell)| ((row + count, col), cell))
            .collect();
        self.cells.extend(shifted);
        for format in &mut self.conditional_formats {
            if format.range.first.row >= at_row {
                format.range.first.row += count;
            }
            if format.range.last.row >= at_row {
                format.range.last.row += count;
            }
        }
    }

    fn add_conditional_format(&mut self, range: CellRange, trigger: &str, style: &Style) {
        self.conditional_formats.push(ConditionalFormat {
            range,
            trigger: trigger.to_string(),
            style: style.clone(),
        });
    }
}
