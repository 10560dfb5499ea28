//! Directory entries, their classification, and sort keys.
//!
//! Every operation of the organizer starts from a fresh snapshot of the
//! direct children of one directory. This module owns that snapshot type
//! ([`DirectoryEntry`]), the kind classifier ([`EntryKind`]) and the
//! comparison keys used to order entries ([`SortKey`]).

use crate::file_organizer::{OrganizeError, OrganizeResult};
use chrono::{DateTime, Local, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// Classification of a filesystem child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Folder,
    /// Anything else the host filesystem reports (sockets, fifos, dangling links).
    Unknown,
}

impl EntryKind {
    fn from_metadata(meta: &fs::Metadata) -> Self {
        if meta.is_dir() {
            EntryKind::Folder
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Unknown
        }
    }

    /// Returns the lowercase label used in filters and listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
            EntryKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a kind filter value. Only `file` and `folder` are accepted,
/// case-insensitively.
impl FromStr for EntryKind {
    type Err = OrganizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(EntryKind::File),
            "folder" => Ok(EntryKind::Folder),
            other => Err(OrganizeError::InvalidArgument(format!(
                "type filter contains invalid item \"{}\"; must be one of: \"file\", \"folder\"",
                other
            ))),
        }
    }
}

/// A key by which directory entries can be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive name without extension.
    Name,
    /// Last modification time.
    Datetime,
    /// Size in bytes as reported by the filesystem.
    Size,
}

impl FromStr for SortKey {
    type Err = OrganizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "datetime" => Ok(SortKey::Datetime),
            "size" => Ok(SortKey::Size),
            other => Err(OrganizeError::InvalidArgument(format!(
                "\"{}\" is not a valid sorting key; must be one of: \"name\", \"datetime\", \"size\"",
                other
            ))),
        }
    }
}

impl SortKey {
    /// Compares two entries by this key.
    pub fn compare(&self, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
        match self {
            SortKey::Name => a.sort_name().cmp(&b.sort_name()),
            SortKey::Datetime => a.modified.cmp(&b.modified),
            SortKey::Size => a.size.cmp(&b.size),
        }
    }
}

/// Stable-sorts entries by `key`. A descending order is the exact reverse of
/// the ascending one, ties included.
pub fn sort_entries(entries: &mut [DirectoryEntry], key: SortKey, ascending: bool) {
    entries.sort_by(|a, b| key.compare(a, b));
    if !ascending {
        entries.reverse();
    }
}

/// One direct child of a directory, captured at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// The final path component.
    pub name: String,
    /// Classified kind.
    pub kind: EntryKind,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl DirectoryEntry {
    /// Reads the metadata of `path` and builds an entry.
    ///
    /// Dangling links and other entries whose target cannot be resolved fall
    /// back to the link's own metadata and are classified as unknown.
    pub fn from_path(path: PathBuf) -> std::io::Result<Self> {
        let (kind, meta) = match fs::metadata(&path) {
            Ok(meta) => (EntryKind::from_metadata(&meta), meta),
            Err(_) => (EntryKind::Unknown, fs::symlink_metadata(&path)?),
        };
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            path,
            name,
            kind,
            size: meta.len(),
            modified,
        })
    }

    /// Name without the final extension (`archive.tar.gz` → `archive.tar`).
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Lowercase extension without the dot, empty when there is none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Extension as written on disk, without the dot.
    pub fn raw_extension(&self) -> String {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Modification time in the local timezone, without zone information.
    pub fn modified_local(&self) -> NaiveDateTime {
        DateTime::<Local>::from(self.modified).naive_local()
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    fn sort_name(&self) -> String {
        self.stem().to_lowercase()
    }
}

/// Reads the direct children of `dir` into memory, in traversal order.
///
/// The whole listing is collected before returning so that callers never
/// mutate a directory while it is being enumerated.
pub fn read_snapshot(dir: &Path) -> OrganizeResult<Vec<DirectoryEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|e| OrganizeError::Filesystem {
        operation: "read directory",
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for child in read_dir {
        let child = child.map_err(|e| OrganizeError::Filesystem {
            operation: "read directory",
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = child.path();
        let entry = DirectoryEntry::from_path(path.clone()).map_err(|e| {
            OrganizeError::Filesystem {
                operation: "read metadata of",
                path,
                source: e,
            }
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn entry(name: &str, size: u64, secs: u64) -> DirectoryEntry {
        DirectoryEntry {
            path: PathBuf::from("/tmp").join(name),
            name: name.to_string(),
            kind: EntryKind::File,
            size,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_kind_from_str_is_case_insensitive() {
        assert_eq!("File".parse::<EntryKind>().unwrap(), EntryKind::File);
        assert_eq!("fOLdER".parse::<EntryKind>().unwrap(), EntryKind::Folder);
    }

    #[test]
    fn test_kind_from_str_rejects_unknown() {
        let err = "unknown".parse::<EntryKind>().unwrap_err();
        assert!(matches!(err, OrganizeError::InvalidArgument(_)));
        assert!("sth".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("NAME".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!("DateTime".parse::<SortKey>().unwrap(), SortKey::Datetime);
        assert_eq!("size".parse::<SortKey>().unwrap(), SortKey::Size);
        assert!("hello".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_extension_and_stem() {
        let e = entry("Archive.TAR.GZ", 0, 0);
        assert_eq!(e.stem(), "Archive.TAR");
        assert_eq!(e.extension(), "gz");
        assert_eq!(e.raw_extension(), "GZ");

        let dotfile = entry(".bashrc", 0, 0);
        assert_eq!(dotfile.stem(), ".bashrc");
        assert_eq!(dotfile.extension(), "");
    }

    #[test]
    fn test_name_sort_ignores_case_and_extension() {
        let mut entries = vec![entry("b.txt", 0, 0), entry("A.zip", 0, 0), entry("c", 0, 0)];
        sort_entries(&mut entries, SortKey::Name, true);
        assert_eq!(names(&entries), vec!["A.zip", "b.txt", "c"]);
    }

    #[test]
    fn test_descending_is_exact_reverse_including_ties() {
        let mut asc = vec![entry("a", 5, 0), entry("b", 5, 0), entry("c", 1, 0)];
        sort_entries(&mut asc, SortKey::Size, true);
        assert_eq!(names(&asc), vec!["c", "a", "b"]);

        let mut desc = vec![entry("a", 5, 0), entry("b", 5, 0), entry("c", 1, 0)];
        sort_entries(&mut desc, SortKey::Size, false);
        assert_eq!(names(&desc), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_datetime_sort() {
        let mut entries = vec![entry("new", 0, 200), entry("old", 0, 100)];
        sort_entries(&mut entries, SortKey::Datetime, true);
        assert_eq!(names(&entries), vec!["old", "new"]);
    }

    #[test]
    fn test_from_path_classifies_file_and_folder() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "x").expect("Failed to write file");
        let folder = temp_dir.path().join("sub");
        fs::create_dir(&folder).expect("Failed to create folder");

        assert_eq!(DirectoryEntry::from_path(file).unwrap().kind, EntryKind::File);
        assert_eq!(
            DirectoryEntry::from_path(folder).unwrap().kind,
            EntryKind::Folder
        );
        assert!(DirectoryEntry::from_path(temp_dir.path().join("missing")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_path_dangling_link_is_unknown() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let link = temp_dir.path().join("broken");
        std::os::unix::fs::symlink(temp_dir.path().join("missing"), &link)
            .expect("Failed to create symlink");

        let entry = DirectoryEntry::from_path(link).expect("Failed to read link");
        assert_eq!(entry.kind, EntryKind::Unknown);
    }

    #[test]
    fn test_read_snapshot_captures_metadata() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("data.bin"), [0u8; 12]).expect("Failed to write file");

        let entries = read_snapshot(temp_dir.path()).expect("Failed to read snapshot");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "data.bin");
        assert_eq!(entries[0].size, 12);
        assert!(entries[0].is_file());
    }

    #[test]
    fn test_read_snapshot_missing_directory() {
        let result = read_snapshot(Path::new("/non/existent/path"));
        assert!(matches!(result, Err(OrganizeError::Filesystem { .. })));
    }
}
