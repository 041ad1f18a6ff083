//! Interactive prompts with bounded retries
//!
//! Every prompt reads whole lines from a generic reader and writes to a
//! generic writer, so each flow is unit-testable with scripted input.
//! Where the console tool this replaces looped forever on bad input, each
//! prompt here gives up after a fixed number of invalid answers.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use kronox_sheet::Recalculation;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::discover;

/// Invalid answers tolerated per prompt before giving up
const MAX_ATTEMPTS: usize = 3;

/// Folder searches the calendar flow runs before giving up
const SEARCH_ROUNDS: usize = 3;

/// Outcome of the theme menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    /// Build every offered theme
    All,
    /// Build the theme at this index in the offered list
    One(usize),
}

/// Outcome of one manual-path prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathEntry {
    /// Search the standard folders again
    Retry,
    /// An existing calendar file
    File(PathBuf),
}

/// Question-and-answer channel over arbitrary streams
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompter over the process stdin and stderr
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writes one line to the prompt stream
    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").context("writing prompt")
    }

    fn read_line(&mut self) -> Result<String> {
        self.output.flush().context("flushing prompt")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("reading answer")?;
        if read == 0 {
            bail!("input ended before the prompt was answered");
        }
        Ok(line.trim().to_string())
    }

    fn invalid(&mut self) -> Result<()> {
        writeln!(self.output, "{}", "Invalid input".red()).context("writing prompt")
    }

    /// Yes/no question; `y`/`yes` and `n`/`no` are accepted in any case
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        writeln!(self.output, "{question} {}", "y/n".yellow())?;
        for _ in 0..MAX_ATTEMPTS {
            match self.read_line()?.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.invalid()?,
            }
        }
        bail!("no valid answer after {MAX_ATTEMPTS} attempts");
    }

    /// Numbered theme menu with an `all` option
    pub fn choose_theme(&mut self, names: &[String]) -> Result<ThemeChoice> {
        writeln!(
            self.output,
            "\nSelect a theme by number, or enter {} to build every theme",
            "all".yellow()
        )?;
        for (index, name) in names.iter().enumerate() {
            writeln!(self.output, "{} {name}", (index + 1).to_string().yellow())?;
        }

        for _ in 0..MAX_ATTEMPTS {
            let answer = self.read_line()?;
            if answer.eq_ignore_ascii_case("all") {
                return Ok(ThemeChoice::All);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=names.len()).contains(&n) => return Ok(ThemeChoice::One(n - 1)),
                _ => self.invalid()?,
            }
        }
        bail!("no valid answer after {MAX_ATTEMPTS} attempts");
    }

    /// Live or frozen reference cells for the generated sheet
    pub fn choose_recalculation(&mut self) -> Result<Recalculation> {
        writeln!(
            self.output,
            "\nEnded rows gray out by comparing against the sheet's today and now cells"
        )?;
        writeln!(
            self.output,
            "{} live    {}",
            "1".yellow(),
            "TODAY()/NOW() formulas, rows gray out as time passes".dimmed()
        )?;
        writeln!(
            self.output,
            "{} frozen  {}",
            "2".yellow(),
            "the generation moment as fixed values".dimmed()
        )?;

        for _ in 0..MAX_ATTEMPTS {
            match self.read_line()?.to_ascii_lowercase().as_str() {
                "1" | "live" => return Ok(Recalculation::Live),
                "2" | "frozen" => return Ok(Recalculation::Frozen),
                _ => self.invalid()?,
            }
        }
        bail!("no valid answer after {MAX_ATTEMPTS} attempts");
    }

    /// One manual path entry; `retry` asks for another folder search
    fn manual_path(&mut self) -> Result<PathEntry> {
        writeln!(
            self.output,
            "Enter a calendar file path, or move the file into place and enter {} to search again",
            "retry".yellow()
        )?;
        for _ in 0..MAX_ATTEMPTS {
            let answer = self.read_line()?;
            if answer.eq_ignore_ascii_case("retry") {
                return Ok(PathEntry::Retry);
            }
            match discover::resolve_input(Path::new(&answer)) {
                Some(path) => return Ok(PathEntry::File(path)),
                None => writeln!(self.output, "{}", "File not found".red())?,
            }
        }
        bail!("no valid answer after {MAX_ATTEMPTS} attempts");
    }
}

/// Walks the search, confirm and manual-entry flow until a calendar file
/// is chosen
///
/// `search` produces the current candidates; it runs again whenever the
/// user asks for a retry after moving a file into place.
pub fn choose_calendar<R, W, F>(prompter: &mut Prompter<R, W>, mut search: F) -> Result<PathBuf>
where
    R: BufRead,
    W: Write,
    F: FnMut() -> Vec<PathBuf>,
{
    for _ in 0..SEARCH_ROUNDS {
        let candidates = search();
        for path in &candidates {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            writeln!(prompter.output, "\nCalendar file found: {name}")?;
            writeln!(
                prompter.output,
                "{}",
                format!("At: {}", path.display()).dimmed()
            )?;
            if prompter.confirm("Do you want to use this file?")? {
                return Ok(path.clone());
            }
        }

        if candidates.is_empty() {
            writeln!(
                prompter.output,
                "\nNo calendar file found in Downloads or Desktop"
            )?;
            writeln!(
                prompter.output,
                "{}",
                "Download your schedule from the KronoX site with 'Get iCal file' / 'Hämta iCal fil'"
                    .dimmed()
            )?;
        } else {
            writeln!(
                prompter.output,
                "\nNo more calendar files found in Downloads or Desktop"
            )?;
        }

        match prompter.manual_path()? {
            PathEntry::Retry => continue,
            PathEntry::File(path) => return Ok(path),
        }
    }
    bail!("no calendar file chosen after {SEARCH_ROUNDS} searches");
}
