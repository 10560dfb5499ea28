//! filelynx - a directory organization utility
//!
//! This library lists the direct children of a directory with filtering and
//! sorting, groups files into subfolders by extension or modification date,
//! and batch-renames files with deterministic numbering and collision-free
//! names. Defaults for the command-line tool come from a TOML configuration
//! file.

pub mod batch_rename;
pub mod cli;
pub mod config;
pub mod entry;
pub mod file_organizer;
pub mod output;

pub use batch_rename::{NumeratorPlacement, RenameSpec, rename_files};
pub use config::{ConfigError, Settings};
pub use entry::{DirectoryEntry, EntryKind, SortKey};
pub use file_organizer::{
    GroupBy, GroupOptions, ListOptions, OrganizeError, OrganizeResult, Organizer, group_files,
    list_entries,
};

pub use cli::{Cli, run};
