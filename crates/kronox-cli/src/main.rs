//! KronoX Converter command line
//!
//! Turns KronoX `.ics` exports into themed spreadsheet schedules. Every
//! prompt of the interactive flow has a flag counterpart, so the binary
//! works both as a guided console tool and inside scripts.

mod discover;
mod interact;

use anyhow::{anyhow, bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use env_logger::{Env, Target};
use indicatif::{ProgressBar, ProgressStyle};
use kronox_calendar::EventSet;
use kronox_sheet::{build_sheet, Recalculation, Theme, WorkbookRenderer};
use log::warn;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::interact::{choose_calendar, Prompter, ThemeChoice};

#[derive(Parser, Debug)]
#[command(
    name = "kronox",
    about = "Convert KronoX calendar exports into spreadsheet schedules",
    long_about = "Convert KronoX calendar exports into spreadsheet schedules.\n\
                  \n\
                  Reads one or more .ics files exported from KronoX, merges and\n\
                  deduplicates their events, and writes one .xlsx workbook per\n\
                  selected theme. Without arguments the Downloads and Desktop\n\
                  folders are searched and every choice is prompted for.",
    version
)]
struct Args {
    /// Calendar files to convert; a missing .ics extension is appended
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Theme to build, by name; repeat the flag for several
    #[arg(short, long, value_name = "NAME", conflicts_with = "all_themes")]
    theme: Vec<String>,

    /// Build every available theme
    #[arg(long)]
    all_themes: bool,

    /// Folder with additional theme files, overriding built-ins by name
    #[arg(long, value_name = "DIR")]
    themes_dir: Option<PathBuf>,

    /// List available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Today/now reference cells: live formulas, or frozen at generation
    #[arg(short, long, value_name = "MODE")]
    recalculation: Option<Recalculation>,

    /// Output workbook path; with several themes the theme name is added
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Leave out every event of this course; repeat the flag for several
    #[arg(long, value_name = "NAME")]
    exclude_course: Vec<String>,

    /// Print the merged event set as JSON and exit
    #[arg(long)]
    dump_events: bool,

    /// Assume yes on every prompt, replacing existing files
    #[arg(short = 'y', long)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Stderr)
        .init();

    let args = Args::parse();

    if let Some(Commands::Completions { shell }) = args.command {
        return completions_command(shell);
    }

    let themes = available_themes(args.themes_dir.as_deref())?;

    if args.list_themes {
        for theme in &themes {
            println!("{}", theme.name);
        }
        return Ok(());
    }

    let interactive = !args.yes && io::stdin().is_terminal();
    let mut prompter = Prompter::stdio();

    if interactive {
        eprintln!("{}", "\nKronoX Converter".cyan().bold());
    }

    let files = collect_inputs(&args, interactive, &mut prompter)?;

    let mut parsed = Vec::with_capacity(files.len());
    for file in &files {
        let events = kronox_calendar::parse_file(file)?;
        if events.is_empty() {
            warn!("{} holds no events", file.display());
        }
        parsed.push(events);
    }
    let mut events = EventSet::merge(parsed);
    for course in &args.exclude_course {
        events.exclude_course(course);
    }

    if args.dump_events {
        println!("{}", serde_json::to_string_pretty(events.events())?);
        return Ok(());
    }

    let selected = select_themes(&themes, &args, interactive, &mut prompter)?;
    let recalculation = match args.recalculation {
        Some(mode) => mode,
        None if interactive => prompter.choose_recalculation()?,
        None => Recalculation::default(),
    };

    build_workbooks(&selected, &events, recalculation, &args, interactive, &mut prompter)
}

/// Built-in themes plus any loaded from `dir`; a loaded theme replaces a
/// built-in carrying the same name
fn available_themes(dir: Option<&Path>) -> Result<Vec<Theme>> {
    let mut themes = Theme::builtin();
    if let Some(dir) = dir {
        for theme in Theme::load_dir(dir)? {
            match themes
                .iter_mut()
                .find(|t| t.name.eq_ignore_ascii_case(&theme.name))
            {
                Some(slot) => *slot = theme,
                None => themes.push(theme),
            }
        }
    }
    Ok(themes)
}

/// The calendar files to parse, from arguments, discovery or prompts
fn collect_inputs<R: BufRead, W: Write>(
    args: &Args,
    interactive: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<Vec<PathBuf>> {
    if !args.inputs.is_empty() {
        return args
            .inputs
            .iter()
            .map(|path| {
                discover::resolve_input(path)
                    .ok_or_else(|| anyhow!("calendar file not found: {}", path.display()))
            })
            .collect();
    }

    if interactive {
        return Ok(vec![choose_calendar(prompter, discover::calendar_files)?]);
    }

    match discover::calendar_files().into_iter().next() {
        Some(path) => {
            eprintln!("Using {}", path.display());
            Ok(vec![path])
        }
        None => bail!("no calendar file found in Downloads or Desktop; pass one as an argument"),
    }
}

/// The themes to build, from flags, the menu or the scripted default
fn select_themes<R: BufRead, W: Write>(
    themes: &[Theme],
    args: &Args,
    interactive: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<Vec<Theme>> {
    if args.all_themes {
        return Ok(themes.to_vec());
    }

    if !args.theme.is_empty() {
        let mut picked = Vec::with_capacity(args.theme.len());
        for name in &args.theme {
            let Some(theme) = themes.iter().find(|t| t.name.eq_ignore_ascii_case(name)) else {
                bail!(
                    "unknown theme '{name}'; available: {}",
                    theme_names(themes).join(", ")
                );
            };
            picked.push(theme.clone());
        }
        return Ok(picked);
    }

    if interactive {
        let names = theme_names(themes);
        return match prompter.choose_theme(&names)? {
            ThemeChoice::All => Ok(themes.to_vec()),
            ThemeChoice::One(index) => Ok(vec![themes[index].clone()]),
        };
    }

    // Scripted run without a theme flag: the first theme
    Ok(vec![themes[0].clone()])
}

fn theme_names(themes: &[Theme]) -> Vec<String> {
    themes.iter().map(|theme| theme.name.clone()).collect()
}

/// Builds and saves one workbook per theme, reporting each outcome
///
/// A failing theme is reported and skipped so the remaining themes still
/// build; the run as a whole fails afterwards.
fn build_workbooks<R: BufRead, W: Write>(
    themes: &[Theme],
    events: &EventSet,
    recalculation: Recalculation,
    args: &Args,
    interactive: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let multiple = themes.len() > 1;
    let overall = Instant::now();
    let mut failed = 0usize;

    for theme in themes {
        let path = resolve_collision(
            output_path(args.output.as_deref(), &theme.name, multiple),
            args.yes,
            interactive,
            prompter,
        )?;

        let spinner = progress_spinner(&format!("Building {} ...", theme.name));
        let start = Instant::now();
        let result = render_workbook(theme, events, recalculation, &path);
        spinner.finish_and_clear();

        match result {
            Ok(()) => eprintln!(
                "{} {} {}",
                "✓".green().bold(),
                path.display(),
                format!("({:.1} sec)", start.elapsed().as_secs_f64()).dimmed()
            ),
            Err(e) => {
                eprintln!("{} {}: {e:#}", "✗".red().bold(), theme.name);
                failed += 1;
            }
        }
    }

    if multiple {
        eprintln!(
            "{} {}",
            "Finished".bold(),
            format!("({:.0} sec)", overall.elapsed().as_secs_f64()).dimmed()
        );
    }

    if failed > 0 {
        bail!("{failed} of {} themes failed", themes.len());
    }
    Ok(())
}

/// Output path for one theme's workbook
///
/// Without `--output` the workbook lands in the working directory named
/// after the theme. An explicit path is used verbatim for a single theme;
/// several themes each get the theme name spliced into it.
fn output_path(output: Option<&Path>, theme_name: &str, multiple: bool) -> PathBuf {
    match output {
        None => PathBuf::from(format!("Schedule {theme_name}.xlsx")),
        Some(path) if multiple => with_theme_suffix(path, theme_name),
        Some(path) => path.to_path_buf(),
    }
}

fn with_theme_suffix(path: &Path, theme_name: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem} {theme_name}.xlsx"))
}

/// Applies the replace-or-rename decision for an existing output file
fn resolve_collision<R: BufRead, W: Write>(
    path: PathBuf,
    yes: bool,
    interactive: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<PathBuf> {
    if !path.exists() || yes {
        return Ok(path);
    }
    if !interactive {
        return Ok(discover::next_unique_name(&path));
    }

    prompter.say(&format!("\n{} already exists", path.display()))?;
    if prompter.confirm("Do you want to replace it?")? {
        Ok(path)
    } else {
        Ok(discover::next_unique_name(&path))
    }
}

fn render_workbook(
    theme: &Theme,
    events: &EventSet,
    recalculation: Recalculation,
    path: &Path,
) -> Result<()> {
    let sink = build_sheet(theme, events, recalculation);
    let mut renderer = WorkbookRenderer::new();
    renderer.add_sheet(&theme.name, &sink)?;
    renderer.save(path)?;
    Ok(())
}

fn progress_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("template is compile-time constant")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Writes a completion script for `shell` to stdout
#[allow(clippy::unnecessary_wraps)] // consistent Result return for command handlers
fn completions_command(shell: Shell) -> Result<()> {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
