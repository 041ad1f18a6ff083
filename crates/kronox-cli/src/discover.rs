//! Locating calendar exports and free output names
//!
//! KronoX users download their schedule through a browser, so the export
//! almost always sits in the Downloads folder, occasionally on the
//! Desktop. Discovery checks exactly those two places, never recursively.

use log::debug;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Folders searched for calendar exports, in search order
#[must_use]
pub fn search_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(dir) = dirs::download_dir() {
        roots.push(dir);
    }
    if let Some(dir) = dirs::desktop_dir() {
        roots.push(dir);
    }
    roots
}

/// Every calendar file directly inside the standard folders
#[must_use]
pub fn calendar_files() -> Vec<PathBuf> {
    search_roots()
        .iter()
        .flat_map(|root| calendar_files_in(root))
        .collect()
}

/// Files with a `.ics` extension (any case) directly inside `dir`,
/// name order
///
/// A folder that cannot be read counts as empty; a missing Desktop is
/// normal on server installs.
#[must_use]
pub fn calendar_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        debug!("cannot read {}, skipping", dir.display());
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_ics_extension(path))
        .collect();
    files.sort();
    files
}

fn has_ics_extension(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("ics"))
}

/// Resolves a user-supplied calendar path
///
/// The path is taken as given when it names an existing file; otherwise
/// `.ics` is appended and tried once more, so `kronox schedule` finds
/// `schedule.ics`.
#[must_use]
pub fn resolve_input(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let with_extension = append_ics(path);
    with_extension.is_file().then_some(with_extension)
}

fn append_ics(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".ics");
    path.with_file_name(name)
}

/// First free name for `path`, probing `name (1)`, `name (2)`, ...
///
/// A counter already present in the stem is stripped first, so probing
/// from `Schedule Dark (3).xlsx` continues the same series instead of
/// nesting parentheses.
#[must_use]
pub fn next_unique_name(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = strip_counter(&stem);
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u32 = 1;
    loop {
        let candidate = path.with_file_name(format!("{base} ({counter}){extension}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// `"name (12)"` becomes `"name"`; anything else is returned unchanged
fn strip_counter(stem: &str) -> &str {
    let Some(rest) = stem.strip_suffix(')') else {
        return stem;
    };
    let Some((base, digits)) = rest.rsplit_once(" (") else {
        return stem;
    };
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        base
    } else {
        stem
    }
}
