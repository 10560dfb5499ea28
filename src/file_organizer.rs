//! Directory organization engine.
//!
//! This module provides the [`Organizer`], bound to one current directory, and
//! the free functions behind it: listing the direct children of a directory,
//! grouping files into subfolders, and (via [`crate::batch_rename`]) renaming
//! files with deterministic numbering. Every operation reads the directory
//! into a snapshot first and only then touches the filesystem.
use crate::batch_rename::{RenameSpec, rename_files};
use crate::entry::{DirectoryEntry, EntryKind, SortKey, read_snapshot, sort_entries};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveTime};
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default strftime format for date subgroups (`31-12-2024`).
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Errors that can occur during organization operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// A selector, filter or numbering parameter is malformed.
    /// Raised before the filesystem is touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The target path does not exist or is not a directory.
    #[error("Invalid directory {}: {reason}", .path.display())]
    InvalidDirectory { path: PathBuf, reason: &'static str },

    /// An I/O error from the filesystem, surfaced as-is.
    #[error("Failed to {operation} {}: {source}", .path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Checks that `path` exists and is a directory.
pub fn ensure_directory(path: &Path) -> OrganizeResult<()> {
    if !path.exists() {
        return Err(OrganizeError::InvalidDirectory {
            path: path.to_path_buf(),
            reason: "path does not exist",
        });
    }
    if !path.is_dir() {
        return Err(OrganizeError::InvalidDirectory {
            path: path.to_path_buf(),
            reason: "path is not a directory",
        });
    }
    Ok(())
}

/// Filtering and ordering options for [`list_entries`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Kinds to keep. Empty keeps both files and folders.
    pub kinds: Vec<EntryKind>,
    /// Lowercase extensions (without the dot) of files to keep. Empty keeps all.
    pub extensions: Vec<String>,
    /// Sort key; `None` sorts by case-insensitive stem.
    pub sort_by: Option<SortKey>,
    /// Reverse the order when false.
    pub descending: bool,
}

impl ListOptions {
    /// Builds options from raw selector strings, validating and normalizing them.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidArgument`] if a kind is not `file` or
    /// `folder`, or if the sort key is not `name`, `datetime` or `size`.
    ///
    /// # Examples
    ///
    /// ```
    /// use filelynx::file_organizer::ListOptions;
    ///
    /// let options = ListOptions::parse(&["File"], &["TXT"], Some("size"), true).unwrap();
    /// assert_eq!(options.extensions, vec!["txt".to_string()]);
    /// assert!(ListOptions::parse(&["pipe"], &[], None, true).is_err());
    /// ```
    pub fn parse<S: AsRef<str>>(
        kinds: &[S],
        extensions: &[S],
        sort_by: Option<&str>,
        ascending: bool,
    ) -> OrganizeResult<Self> {
        let kinds = kinds
            .iter()
            .map(|k| k.as_ref().parse::<EntryKind>())
            .collect::<Result<Vec<_>, _>>()?;
        let sort_by = sort_by.map(SortKey::from_str).transpose()?;

        Ok(Self {
            kinds,
            extensions: normalize_extensions(extensions),
            sort_by,
            descending: !ascending,
        })
    }

    fn matches(&self, entry: &DirectoryEntry) -> bool {
        if entry.kind == EntryKind::Unknown {
            return false;
        }
        if !self.kinds.is_empty() && !self.kinds.contains(&entry.kind) {
            return false;
        }
        if entry.kind == EntryKind::File && !matches_extension(&self.extensions, entry) {
            return false;
        }
        true
    }
}

/// Lowercases a list of extensions.
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().to_lowercase())
        .collect()
}

/// Extension filter shared by listing and renaming. An empty filter matches
/// everything; an active filter never matches a file without an extension.
pub(crate) fn matches_extension(extensions: &[String], entry: &DirectoryEntry) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let ext = entry.extension();
    !ext.is_empty() && extensions.contains(&ext)
}

/// Lists the direct children of `dir`, filtered and sorted.
///
/// Entries are first ordered by case-insensitive stem; a size or datetime
/// sort is then applied stably on top of that, so ties keep name order.
/// Entries that are neither files nor folders are never returned.
///
/// # Arguments
///
/// * `dir` - The directory to list
/// * `options` - Kind/extension filters and sort order
pub fn list_entries(dir: &Path, options: &ListOptions) -> OrganizeResult<Vec<DirectoryEntry>> {
    ensure_directory(dir)?;

    let mut entries = read_snapshot(dir)?;
    sort_entries(&mut entries, SortKey::Name, true);
    if let Some(key) = options.sort_by
        && key != SortKey::Name
    {
        sort_entries(&mut entries, key, true);
    }
    if options.descending {
        entries.reverse();
    }

    entries.retain(|entry| options.matches(entry));
    debug!(dir = %dir.display(), count = entries.len(), "listed directory");
    Ok(entries)
}

/// What files are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Lowercase file extension.
    Extension,
    /// Last modification date.
    Date,
}

impl FromStr for GroupBy {
    type Err = OrganizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ext" => Ok(GroupBy::Extension),
            "date" => Ok(GroupBy::Date),
            other => Err(OrganizeError::InvalidArgument(format!(
                "\"{}\" is not a valid subgrouping condition; must be one of: \"ext\", \"date\"",
                other
            ))),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Extension => f.write_str("ext"),
            GroupBy::Date => f.write_str("date"),
        }
    }
}

/// Options for [`group_files`].
#[derive(Debug, Clone)]
pub struct GroupOptions {
    pub by: GroupBy,
    /// Extension → folder name overrides. Keys are matched case-insensitively.
    pub mappings: HashMap<String, String>,
    /// strftime format used for date folder names.
    pub date_format: String,
}

impl GroupOptions {
    pub fn new(by: GroupBy) -> Self {
        Self {
            by,
            mappings: HashMap::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_mappings(mut self, mappings: HashMap<String, String>) -> Self {
        self.mappings = mappings;
        self
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }
}

/// Moves every file of `dir` into a subfolder named after its extension or
/// modification date. Folders are never moved.
///
/// Destination folders are created on demand. If a file of the same name
/// already sits at the destination, the moved file gets ` (1)` appended to its
/// stem; that suffix is not probed any further, so a second collision
/// overwrites the earlier ` (1)` file. A file without an extension resolves to
/// the empty folder name, i.e. `dir` itself, and is therefore renamed to
/// `<stem> (1)` in place.
///
/// # Returns
///
/// The number of subfolders that did not exist before the call.
///
/// # Errors
///
/// Invalid date formats are rejected before any file is moved. The first
/// failing create or move aborts the call; files already moved stay moved.
pub fn group_files(dir: &Path, options: &GroupOptions) -> OrganizeResult<usize> {
    if options.by == GroupBy::Date {
        validate_date_format(&options.date_format)?;
    }
    ensure_directory(dir)?;

    let mappings: HashMap<String, &str> = options
        .mappings
        .iter()
        .map(|(ext, folder)| (ext.to_lowercase(), folder.as_str()))
        .collect();

    let files: Vec<DirectoryEntry> = read_snapshot(dir)?
        .into_iter()
        .filter(DirectoryEntry::is_file)
        .collect();

    let mut created: HashSet<PathBuf> = HashSet::new();
    for file in &files {
        let folder_name = match options.by {
            GroupBy::Extension => {
                let ext = file.extension();
                match mappings.get(&ext) {
                    Some(folder) => folder.to_string(),
                    None => ext,
                }
            }
            GroupBy::Date => format_date(file, &options.date_format)?,
        };

        move_into_subgroup(dir, file, &folder_name, &mut created)?;
    }

    info!(
        dir = %dir.display(),
        by = %options.by,
        files = files.len(),
        created = created.len(),
        "grouped files"
    );
    Ok(created.len())
}

/// Moves one file into `dir/folder_name`, creating the folder when absent.
fn move_into_subgroup(
    dir: &Path,
    file: &DirectoryEntry,
    folder_name: &str,
    created: &mut HashSet<PathBuf>,
) -> OrganizeResult<()> {
    let destination_dir = if folder_name.is_empty() {
        dir.to_path_buf()
    } else {
        dir.join(folder_name)
    };

    if !destination_dir.exists() {
        fs::create_dir(&destination_dir).map_err(|e| OrganizeError::Filesystem {
            operation: "create directory",
            path: destination_dir.clone(),
            source: e,
        })?;
        debug!(folder = %destination_dir.display(), "created subgroup folder");
        created.insert(destination_dir.clone());
    }

    let mut destination = destination_dir.join(&file.name);
    if destination.exists() {
        destination = destination_dir.join(suffixed_name(&file.stem(), &file.raw_extension(), 1));
        warn!(
            file = %file.name,
            destination = %destination.display(),
            "name taken at destination, appending (1)"
        );
    }

    move_path(&file.path, &destination)
}

/// Renames `from` to `to`, wrapping the I/O error with the source path.
pub(crate) fn move_path(from: &Path, to: &Path) -> OrganizeResult<()> {
    fs::rename(from, to).map_err(|e| OrganizeError::Filesystem {
        operation: "move",
        path: from.to_path_buf(),
        source: e,
    })?;
    debug!(from = %from.display(), to = %to.display(), "moved");
    Ok(())
}

/// Builds `"{stem} ({n})"` followed by the extension, if any.
pub(crate) fn suffixed_name(stem: &str, extension: &str, n: u64) -> String {
    with_extension(&format!("{} ({})", stem, n), extension)
}

/// Appends `.extension` to `stem` unless the extension is empty.
pub(crate) fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Formats the local modification date of `file`, as midnight of that day.
fn format_date(file: &DirectoryEntry, format: &str) -> OrganizeResult<String> {
    render_date(file.modified_local().date(), format)
}

fn render_date(date: NaiveDate, format: &str) -> OrganizeResult<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.and_time(NaiveTime::MIN).format(format)).map_err(|_| {
        OrganizeError::InvalidArgument(format!("\"{}\" is not a valid date format", format))
    })?;
    Ok(rendered)
}

/// Rejects strftime formats chrono cannot parse or cannot render for a date.
fn validate_date_format(format: &str) -> OrganizeResult<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(OrganizeError::InvalidArgument(format!(
            "\"{}\" is not a valid date format",
            format
        )));
    }
    render_date(NaiveDate::default(), format).map(|_| ())
}

/// Organizes the direct children of one current directory.
///
/// The current directory is validated whenever it is set. Each operation
/// re-reads the directory, so nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Organizer {
    current_dir: PathBuf,
}

impl Organizer {
    /// Creates an organizer bound to `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidDirectory`] if `dir` does not exist or
    /// is not a directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filelynx::file_organizer::{ListOptions, Organizer};
    ///
    /// let organizer = Organizer::new("/path/to/downloads").unwrap();
    /// for entry in organizer.list(&ListOptions::default()).unwrap() {
    ///     println!("{} ({})", entry.name, entry.kind);
    /// }
    /// ```
    pub fn new(dir: impl AsRef<Path>) -> OrganizeResult<Self> {
        let dir = dir.as_ref();
        ensure_directory(dir)?;
        Ok(Self {
            current_dir: dir.to_path_buf(),
        })
    }

    /// Bound to the process working directory.
    pub fn from_cwd() -> OrganizeResult<Self> {
        Self::new(current_working_dir()?)
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Switches to `dir`. On error the current directory is left unchanged.
    pub fn set_dir(&mut self, dir: impl AsRef<Path>) -> OrganizeResult<()> {
        let dir = dir.as_ref();
        ensure_directory(dir)?;
        self.current_dir = dir.to_path_buf();
        Ok(())
    }

    /// Switches to the process working directory.
    pub fn sync_to_cwd(&mut self) -> OrganizeResult<()> {
        let cwd = current_working_dir()?;
        self.set_dir(cwd)
    }

    /// Lists the current directory. See [`list_entries`].
    pub fn list(&self, options: &ListOptions) -> OrganizeResult<Vec<DirectoryEntry>> {
        list_entries(&self.current_dir, options)
    }

    /// Groups the files of the current directory. See [`group_files`].
    pub fn group(&self, options: &GroupOptions) -> OrganizeResult<usize> {
        group_files(&self.current_dir, options)
    }

    /// Batch-renames files of the current directory. See [`rename_files`].
    pub fn rename(&self, spec: &RenameSpec) -> OrganizeResult<usize> {
        rename_files(&self.current_dir, spec)
    }
}

fn current_working_dir() -> OrganizeResult<PathBuf> {
    std::env::current_dir().map_err(|e| OrganizeError::Filesystem {
        operation: "resolve",
        path: PathBuf::from("."),
        source: e,
    })
}
