//! Error types for schedule sheet construction

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SheetError>;

/// Errors raised while loading themes or rendering a workbook
#[derive(Debug, Error)]
pub enum SheetError {
    /// A theme file could not be read from disk
    #[error("failed to read theme file {path}: {source}")]
    ThemeRead {
        /// Path of the theme file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A theme file contained a line the loader does not understand
    ///
    /// One bad line invalidates the whole theme, never a partial load.
    #[error("malformed theme file {path} at line {line_no}: {line:?}")]
    ThemeParse {
        /// Path of the theme file
        path: PathBuf,
        /// 1-based number of the offending line
        line_no: usize,
        /// The offending line, verbatim
        line: String,
    },

    /// The spreadsheet library rejected a write or could not save
    #[error("failed to write workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl SheetError {
    /// Creates a [`SheetError::ThemeRead`] from a path and an I/O error
    #[inline]
    #[must_use = "this returns a new error and does not raise it"]
    pub fn theme_read<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::ThemeRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a [`SheetError::ThemeParse`] for a line that failed to parse
    #[inline]
    #[must_use = "this returns a new error and does not raise it"]
    pub fn theme_parse<P: AsRef<Path>>(path: P, line_no: usize, line: &str) -> Self {
        Self::ThemeParse {
            path: path.as_ref().to_path_buf(),
            line_no,
            line: line.to_string(),
        }
    }
}
