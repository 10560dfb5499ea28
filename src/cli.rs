//! Command-line interface module for filelynx.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing and validation
//! - Translation of the human date-format wildcards into strftime
//! - Merging configured defaults with command-line flags
//! - Dispatching to the [`Organizer`] and reporting results

use crate::batch_rename::{NumeratorPlacement, RenameSpec};
use crate::config::{ConfigError, Settings};
use crate::entry::{EntryKind, SortKey};
use crate::file_organizer::{GroupBy, GroupOptions, ListOptions, OrganizeError, Organizer};
use crate::output::OutputFormatter;
use chrono::NaiveDateTime;
use clap::{ArgAction, Args, Parser, Subcommand};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Datetime format accepted by `--after` and `--before`.
pub const DATETIME_ARG_FORMAT: &str = "%d-%m-%Y_%H:%M:%S";

static MAPPING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^>]+?>[^>]+$").expect("valid mapping regex"));
static EXTENSIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:,[a-z0-9]+)*$").expect("valid extensions regex"));
static DATE_FORMAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\s.-]+$").expect("valid date format regex"));

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const INVALID_ARGUMENT: u8 = 2;
    pub const INVALID_DIRECTORY: u8 = 3;
    pub const FILESYSTEM_ERROR: u8 = 4;
    pub const CONFIG_ERROR: u8 = 5;
}

/// FileLynx - a handy file organisation tool
///
/// List, group and batch-rename the files of a directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "filelynx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file
    ///
    /// Defaults to .filelynxrc.toml in the working directory, then
    /// ~/.config/filelynx/config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Run as if started in this directory instead of the working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Displays the contents of a directory
    Show(ShowArgs),

    /// Groups files of the directory into subfolders
    ///
    /// Files can be grouped by extension (ext) or by last modification date
    /// (date). The date format accepts letters, digits, spaces, "_", "." and
    /// "-" and provides these wildcards: d (day), D (zero-padded day),
    /// m (month), M (zero-padded month), month (abbreviated month name),
    /// Month (full month name), y (two-digit year), Y (full year).
    #[command(name = "groupby")]
    GroupBy(GroupByArgs),

    /// Renames files of the directory with numbering applied
    ///
    /// The resulting file names look like "{NAME}{SEP}{NUMERATOR}" or
    /// "{NUMERATOR}{SEP}{NAME}"; extensions are kept.
    #[command(name = "batchrename")]
    BatchRename(BatchRenameArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// The directory to show the contents of (defaults to the working directory)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Defines the value by which entries are sorted (name, datetime, size)
    #[arg(short = 's', long = "sort-by", value_parser = parse_sort_key)]
    pub sort_by: Option<SortKey>,

    /// Comma-separated list of file extensions to show (e.g. "txt,jpg,docx")
    #[arg(short = 'e', long, value_parser = validate_extensions)]
    pub extensions: Option<String>,

    /// Show directories only
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    pub dirs: bool,

    /// Show files only
    #[arg(short = 'f', long, action = ArgAction::SetTrue)]
    pub files: bool,

    /// Display entries in descending order
    #[arg(long, action = ArgAction::SetTrue)]
    pub desc: bool,

    /// Print the listing as JSON instead of a table
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GroupByArgs {
    /// Which field to group by ("ext" - extension, "date" - last modification date)
    #[arg(value_parser = parse_group_by)]
    pub by: GroupBy,

    /// Maps an extension to a subfolder name, as "extension>folder_name"
    ///
    /// Can be given multiple times. Unmapped extensions use their own name.
    #[arg(short = 'm', long = "map", value_parser = parse_mapping)]
    pub mappings: Vec<(String, String)>,

    /// Formatting to apply when grouping by last modification date [default: D-M-Y]
    #[arg(short = 'f', long = "format", value_parser = validate_date_format)]
    pub date_format: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct BatchRenameArgs {
    /// New name to use while renaming
    pub name: String,

    /// Symbols placed between the name and the numerator [default: _]
    #[arg(long)]
    pub sep: Option<String>,

    /// Starting point of the numbering [default: 1]
    #[arg(short = 'S', long = "num-start", allow_negative_numbers = true)]
    pub num_start: Option<i64>,

    /// Place the numerator before the name
    #[arg(short = 'F', long = "num-first", action = ArgAction::SetTrue)]
    pub num_first: bool,

    /// Length of zero-padding applied to the numerator [default: 0]
    #[arg(short = 'p', long, allow_negative_numbers = true)]
    pub pad: Option<i32>,

    /// Comma-separated list of file extensions to rename (e.g. "txt,jpg,docx")
    #[arg(short = 'e', long, value_parser = validate_extensions)]
    pub extensions: Option<String>,

    /// Skip files modified earlier than this (DD-MM-YYYY_HH:MM:SS)
    #[arg(short = 'a', long, value_parser = parse_datetime)]
    pub after: Option<NaiveDateTime>,

    /// Skip files modified later than this (DD-MM-YYYY_HH:MM:SS)
    #[arg(short = 'b', long, value_parser = parse_datetime)]
    pub before: Option<NaiveDateTime>,

    /// Defines the value by which files are sorted for numbering
    #[arg(short = 's', long = "sort-by", value_parser = parse_sort_key)]
    pub sort_by: Option<SortKey>,

    /// Sort in descending order. Ignored without --sort-by
    #[arg(long, action = ArgAction::SetTrue)]
    pub desc: bool,
}

/// Errors surfaced to the user by [`run`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    /// The process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Organize(OrganizeError::InvalidArgument(_)) => exit_codes::INVALID_ARGUMENT,
            CliError::Organize(OrganizeError::InvalidDirectory { .. }) => {
                exit_codes::INVALID_DIRECTORY
            }
            CliError::Organize(OrganizeError::Filesystem { .. }) => exit_codes::FILESYSTEM_ERROR,
            CliError::Config(_) => exit_codes::CONFIG_ERROR,
        }
    }
}

/// Runs a parsed command line.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use filelynx::cli::{Cli, run};
///
/// let cli = Cli::parse_from(["filelynx", "-C", "/path/to/downloads", "groupby", "ext"]);
/// if let Err(e) = run(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;

    match &cli.command {
        Command::Show(args) => {
            let dir = args.dir.as_deref().or(cli.directory.as_deref());
            show(dir, args)
        }
        Command::GroupBy(args) => group_by(cli.directory.as_deref(), args, &settings),
        Command::BatchRename(args) => batch_rename(cli.directory.as_deref(), args, &settings),
    }
}

fn organizer_for(dir: Option<&Path>) -> Result<Organizer, OrganizeError> {
    match dir {
        Some(dir) => Organizer::new(dir),
        None => Organizer::from_cwd(),
    }
}

fn show(dir: Option<&Path>, args: &ShowArgs) -> Result<(), CliError> {
    let organizer = organizer_for(dir)?;

    let kinds = match (args.dirs, args.files) {
        (true, true) => vec![EntryKind::Folder, EntryKind::File],
        (true, false) => vec![EntryKind::Folder],
        (false, true) => vec![EntryKind::File],
        (false, false) => Vec::new(),
    };
    let options = ListOptions {
        kinds,
        extensions: args
            .extensions
            .as_deref()
            .map(split_extensions)
            .unwrap_or_default(),
        sort_by: args.sort_by,
        descending: args.desc,
    };

    let entries = organizer.list(&options)?;
    if args.json {
        OutputFormatter::entry_json(&entries);
    } else {
        OutputFormatter::entry_table(&entries);
    }
    Ok(())
}

fn group_by(dir: Option<&Path>, args: &GroupByArgs, settings: &Settings) -> Result<(), CliError> {
    let organizer = organizer_for(dir)?;

    let mut mappings = settings.normalized_mappings();
    mappings.extend(args.mappings.iter().cloned());

    let human_format = args
        .date_format
        .as_deref()
        .unwrap_or(&settings.group.date_format);
    let options = GroupOptions::new(args.by)
        .with_mappings(mappings)
        .with_date_format(convert_date_format(human_format));

    let created = organizer.group(&options)?;
    OutputFormatter::success(&format!("{} subfolders successfully created!", created));
    Ok(())
}

fn batch_rename(
    dir: Option<&Path>,
    args: &BatchRenameArgs,
    settings: &Settings,
) -> Result<(), CliError> {
    let organizer = organizer_for(dir)?;

    let spec = RenameSpec {
        new_name: args.name.clone(),
        separator: args
            .sep
            .clone()
            .unwrap_or_else(|| settings.rename.separator.clone()),
        numerator_start: args.num_start.unwrap_or(settings.rename.numerator_start),
        placement: if args.num_first {
            NumeratorPlacement::Prefix
        } else {
            NumeratorPlacement::Suffix
        },
        zero_pad: args.pad.unwrap_or(settings.rename.zero_pad),
        extensions: args
            .extensions
            .as_deref()
            .map(split_extensions)
            .unwrap_or_default(),
        after: args.after,
        before: args.before,
        sort_by: args.sort_by,
        ascending: !args.desc,
    };

    let renamed = organizer.rename(&spec)?;
    OutputFormatter::success(&format!("Renamed {} files successfully!", renamed));
    Ok(())
}

/// Translates the human date-format wildcards into a strftime format.
///
/// `month` → `%b`, `Month` → `%B`, `D` → `%d`, `M` → `%m`, `y` → `%y`,
/// `Y` → `%Y`, `d` → `%-d`, `m` → `%-m`. Everything else is literal.
///
/// # Examples
///
/// ```
/// use filelynx::cli::convert_date_format;
///
/// assert_eq!(convert_date_format("D-M-Y"), "%d-%m-%Y");
/// assert_eq!(convert_date_format("d Month Y"), "%-d %B %Y");
/// ```
pub fn convert_date_format(human: &str) -> String {
    let mut out = String::with_capacity(human.len() * 2);
    let mut rest = human;
    while let Some(c) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("month") {
            out.push_str("%b");
            rest = tail;
            continue;
        }
        if let Some(tail) = rest.strip_prefix("Month") {
            out.push_str("%B");
            rest = tail;
            continue;
        }
        match c {
            'D' => out.push_str("%d"),
            'M' => out.push_str("%m"),
            'y' => out.push_str("%y"),
            'Y' => out.push_str("%Y"),
            'd' => out.push_str("%-d"),
            'm' => out.push_str("%-m"),
            '%' => out.push_str("%%"),
            other => out.push(other),
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Splits a validated extension list into lowercase, trimmed items.
pub fn split_extensions(extensions: &str) -> Vec<String> {
    extensions
        .split(',')
        .map(|ext| ext.trim().to_lowercase())
        .collect()
}

fn validate_extensions(value: &str) -> Result<String, String> {
    if EXTENSIONS_RE.is_match(&value.to_lowercase()) {
        Ok(value.to_string())
    } else {
        Err(format!(
            "value \"{}\" has a wrong format; must be a comma-separated list of extensions, \
             e.g. \"extension1[,extension2]\"",
            value
        ))
    }
}

fn validate_date_format(value: &str) -> Result<String, String> {
    if DATE_FORMAT_RE.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(format!(
            "value \"{}\" has a wrong format; it can only contain letters, digits, spaces, \
             \"_\", \".\" and \"-\" characters",
            value
        ))
    }
}

fn parse_mapping(value: &str) -> Result<(String, String), String> {
    let wrong_format = || {
        format!(
            "mapping \"{}\" has a wrong format; must be [extension>folder_name]",
            value
        )
    };
    if !MAPPING_RE.is_match(value) {
        return Err(wrong_format());
    }
    let (extension, folder) = value.split_once('>').ok_or_else(wrong_format)?;
    Ok((extension.trim().to_lowercase(), folder.trim().to_string()))
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, DATETIME_ARG_FORMAT)
        .map_err(|_| format!("value \"{}\" must match format \"{}\"", value, DATETIME_ARG_FORMAT))
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    value.parse().map_err(|e: OrganizeError| e.to_string())
}

fn parse_group_by(value: &str) -> Result<GroupBy, String> {
    value.parse().map_err(|e: OrganizeError| e.to_string())
}
