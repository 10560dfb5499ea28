//! Batch renaming of files with deterministic numbering.
//!
//! Files of one directory are renamed to `{name}{sep}{numerator}` or
//! `{numerator}{sep}{name}`, keeping their original extension. The set of
//! files can be narrowed by extension and by a modification-time window, and
//! ordered by any [`SortKey`] before numbering.

use crate::entry::{DirectoryEntry, SortKey, read_snapshot, sort_entries};
use crate::file_organizer::{
    OrganizeError, OrganizeResult, ensure_directory, matches_extension, move_path,
    normalize_extensions, suffixed_name, with_extension,
};
use chrono::NaiveDateTime;
use std::path::{Path, is_separator};
use tracing::{debug, info};

/// Where the numerator goes relative to the new name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumeratorPlacement {
    /// `{numerator}{sep}{name}`
    Prefix,
    /// `{name}{sep}{numerator}`
    #[default]
    Suffix,
}

/// Parameters of one batch rename.
#[derive(Debug, Clone)]
pub struct RenameSpec {
    /// The new name stem shared by all renamed files.
    pub new_name: String,
    /// Placed between the name and the numerator.
    pub separator: String,
    /// First numerator value. Must not be negative.
    pub numerator_start: i64,
    pub placement: NumeratorPlacement,
    /// Minimum digit count of the numerator. Zero or negative means no padding.
    pub zero_pad: i32,
    /// Lowercase extensions to rename. Empty renames every file.
    pub extensions: Vec<String>,
    /// Only files modified at or after this local time.
    pub after: Option<NaiveDateTime>,
    /// Only files modified at or before this local time.
    pub before: Option<NaiveDateTime>,
    /// Numbering order; `None` keeps directory traversal order.
    pub sort_by: Option<SortKey>,
    /// Reverse the sort order when false. Ignored without `sort_by`.
    pub ascending: bool,
}

impl RenameSpec {
    /// Creates a spec with the defaults: `_` separator, numbering from 1 as a
    /// suffix, no padding, no filters, traversal order.
    pub fn new(new_name: impl Into<String>) -> Self {
        Self {
            new_name: new_name.into(),
            separator: "_".to_string(),
            numerator_start: 1,
            placement: NumeratorPlacement::Suffix,
            zero_pad: 0,
            extensions: Vec::new(),
            after: None,
            before: None,
            sort_by: None,
            ascending: true,
        }
    }

    /// Checks the name parts, the numbering parameters and the time window.
    pub fn validate(&self) -> OrganizeResult<()> {
        for (label, part) in [("name", &self.new_name), ("separator", &self.separator)] {
            if part.chars().any(is_separator) {
                return Err(OrganizeError::InvalidArgument(format!(
                    "{} \"{}\" must not contain path separators",
                    label, part
                )));
            }
        }
        if let (Some(after), Some(before)) = (self.after, self.before)
            && after > before
        {
            return Err(OrganizeError::InvalidArgument(format!(
                "'before' ({}) can't be earlier than 'after' ({})",
                before, after
            )));
        }
        if self.numerator_start < 0 {
            return Err(OrganizeError::InvalidArgument(format!(
                "numerator start cannot be below zero (got {})",
                self.numerator_start
            )));
        }
        Ok(())
    }

    /// The stem for the file numbered `numerator`.
    pub fn stem_for(&self, numerator: i64) -> String {
        let width = self.zero_pad.max(0) as usize;
        let number = format!("{:0width$}", numerator, width = width);
        match self.placement {
            NumeratorPlacement::Prefix => format!("{}{}{}", number, self.separator, self.new_name),
            NumeratorPlacement::Suffix => format!("{}{}{}", self.new_name, self.separator, number),
        }
    }

    fn in_window(&self, entry: &DirectoryEntry) -> bool {
        if self.after.is_none() && self.before.is_none() {
            return true;
        }
        let modified = entry.modified_local();
        self.after.is_none_or(|after| modified >= after)
            && self.before.is_none_or(|before| modified <= before)
    }
}

/// Renames the files of `dir` selected by `spec` and returns how many were renamed.
///
/// Files are collected and ordered before the first rename. Each file keeps
/// its extension. When the target name is taken, ` (N)` is appended to the
/// computed stem; `N` starts at 1 and keeps counting across the whole call,
/// it is not reset per file.
///
/// # Errors
///
/// Invalid specs are rejected before any rename. A failing rename aborts the
/// call; files renamed before it keep their new names.
///
/// # Examples
///
/// ```no_run
/// use filelynx::batch_rename::{RenameSpec, rename_files};
/// use std::path::Path;
///
/// let spec = RenameSpec {
///     separator: "-".to_string(),
///     zero_pad: 3,
///     ..RenameSpec::new("holiday")
/// };
/// let renamed = rename_files(Path::new("/path/to/photos"), &spec).unwrap();
/// println!("Renamed {} files", renamed);
/// ```
pub fn rename_files(dir: &Path, spec: &RenameSpec) -> OrganizeResult<usize> {
    spec.validate()?;
    ensure_directory(dir)?;

    let extensions = normalize_extensions(&spec.extensions);
    let mut files: Vec<DirectoryEntry> = read_snapshot(dir)?
        .into_iter()
        .filter(|entry| {
            entry.is_file() && matches_extension(&extensions, entry) && spec.in_window(entry)
        })
        .collect();

    if let Some(key) = spec.sort_by {
        sort_entries(&mut files, key, spec.ascending);
    }

    let last = i64::try_from(files.len().saturating_sub(1))
        .ok()
        .and_then(|n| spec.numerator_start.checked_add(n))
        .ok_or_else(|| {
            OrganizeError::InvalidArgument(format!(
                "numbering {} files from {} overflows the numerator",
                files.len(),
                spec.numerator_start
            ))
        })?;

    let mut collision_counter: u64 = 1;
    let mut renamed = 0;

    for (numerator, file) in (spec.numerator_start..=last).zip(&files) {
        let stem = spec.stem_for(numerator);
        let extension = file.raw_extension();
        let mut target = dir.join(with_extension(&stem, &extension));
        while target.exists() {
            target = dir.join(suffixed_name(&stem, &extension, collision_counter));
            collision_counter += 1;
        }

        move_path(&file.path, &target)?;
        debug!(numerator, target = %target.display(), "renamed {}", file.name);
        renamed += 1;
    }

    info!(dir = %dir.display(), renamed, "batch rename finished");
    Ok(renamed)
}
