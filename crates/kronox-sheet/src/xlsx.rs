//! xlsx rendering
//!
//! Turns buffered [`MemorySink`] cell state into a workbook, one worksheet
//! per theme. This is the only module that talks to the spreadsheet
//! library; everything above it works against the sink abstraction.

use crate::error::Result;
use crate::sink::{CellValue, MemorySink, Style};
use rust_xlsxwriter::{ConditionalFormatFormula, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// Accumulates rendered sheets and saves them as one workbook
pub struct WorkbookRenderer {
    workbook: Workbook,
    sheet_names: Vec<String>,
}

impl WorkbookRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheet_names: Vec::new(),
        }
    }

    /// Renders one sheet from buffered cell state
    ///
    /// # Errors
    ///
    /// Fails when the sheet name is invalid or already used, or when the
    /// library rejects a write. The library itself flags a reused name only
    /// on save, so names are checked here, where the colliding theme is
    /// still known.
    pub fn add_sheet(&mut self, name: &str, sink: &MemorySink) -> Result<()> {
        // Worksheet names are case-insensitive in the file format.
        if self.sheet_names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Err(XlsxError::SheetnameReused(name.to_string()).into());
        }
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(name)?;
        self.sheet_names.push(name.to_string());
        set_column_widths(worksheet)?;

        for (at, cell) in sink.cells() {
            let format = format_for(&cell.style);
            match (&cell.formula, &cell.value) {
                (Some(formula), _) => {
                    worksheet.write_formula_with_format(at.row, at.col, formula.as_str(), &format)?;
                }
                (None, Some(CellValue::Text(text))) => {
                    worksheet.write_with_format(at.row, at.col, text.as_str(), &format)?;
                }
                (None, Some(CellValue::Number(number))) => {
                    worksheet.write_with_format(at.row, at.col, *number, &format)?;
                }
                (None, None) => {
                    worksheet.write_blank(at.row, at.col, &format)?;
                }
            }
        }

        for conditional in sink.conditional_formats() {
            let rule = ConditionalFormatFormula::new()
                .set_rule(conditional.trigger.as_str())
                .set_format(format_for(&conditional.style));
            worksheet.add_conditional_format(
                conditional.range.first.row,
                conditional.range.first.col,
                conditional.range.last.row,
                conditional.range.last.col,
                &rule,
            )?;
        }
        Ok(())
    }

    /// Saves the workbook to disk
    ///
    /// # Errors
    ///
    /// Fails when the workbook holds no sheets or the file cannot be
    /// written.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.workbook.save(path.as_ref())?;
        Ok(())
    }

    /// Serializes the workbook into memory, mainly for tests
    ///
    /// # Errors
    ///
    /// Same failures as [`WorkbookRenderer::save`] short of file I/O.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }
}

impl Default for WorkbookRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn format_for(style: &Style) -> Format {
    let mut format = Format::new();
    if let Some(fill) = style.fill {
        format = format.set_background_color(fill);
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(color);
    }
    if let Some(name) = &style.font_name {
        format = format.set_font_name(name);
    }
    if let Some(color) = style.border_bottom {
        format = format
            .set_border_bottom(FormatBorder::Thin)
            .set_border_bottom_color(color);
    }
    format
}

fn set_column_widths(worksheet: &mut Worksheet) -> Result<()> {
    for (col, width) in [
        (0, 2.5),
        (1, 2.5),
        (2, 3.0),
        (3, 12.0),
        (4, 6.0),
        (5, 16.0),
        (6, 9.0),
        (7, 2.5),
        (8, 42.0),
        (9, 16.0),
        (10, 3.0),
    ] {
        worksheet.set_column_width(col, width)?;
    }
    Ok(())
}
