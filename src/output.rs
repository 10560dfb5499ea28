//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status
//! messages, the directory listing table, and its JSON form.

use crate::entry::{DirectoryEntry, EntryKind};
use chrono::{DateTime, Local};
use colored::*;
use serde_json::{Value, json};

/// Timestamp format of the "Modified" column.
pub const MODIFIED_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

const HEADERS: [&str; 5] = ["Name", "Type", "Modified", "Size", "Extension"];

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filelynx::output::OutputFormatter;
    /// OutputFormatter::success("3 subfolders successfully created!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints directory entries as an aligned table.
    pub fn entry_table(entries: &[DirectoryEntry]) {
        Self::plain(&Self::render_table(entries));
    }

    /// Prints directory entries as a pretty JSON array.
    pub fn entry_json(entries: &[DirectoryEntry]) {
        let value = Value::Array(entries.iter().map(Self::entry_to_json).collect());
        match serde_json::to_string_pretty(&value) {
            Ok(text) => Self::plain(&text),
            Err(e) => Self::error(&format!("Could not serialize listing: {}", e)),
        }
    }

    /// Renders the listing table. Colors are applied after padding so that
    /// escape codes do not break the column widths.
    pub fn render_table(entries: &[DirectoryEntry]) -> String {
        let rows: Vec<[String; 5]> = entries.iter().map(Self::row).collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = HEADERS
            .iter()
            .zip(widths.iter())
            .map(|(h, w)| format!("{:<w$}", h, w = *w).bold().to_string())
            .collect();
        out.push_str(header.join(" | ").trim_end());
        out.push('\n');
        let total_width = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);
        out.push_str(&"-".repeat(total_width));

        for (row, entry) in rows.iter().zip(entries) {
            out.push('\n');
            let cells: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, w))| {
                    let padded = format!("{:<w$}", cell, w = *w);
                    if i == 0 && entry.kind == EntryKind::Folder {
                        padded.blue().bold().to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            out.push_str(cells.join(" | ").trim_end());
        }
        out
    }

    fn row(entry: &DirectoryEntry) -> [String; 5] {
        let extension = if entry.raw_extension().is_empty() {
            String::new()
        } else {
            format!(".{}", entry.extension())
        };
        [
            entry.name.clone(),
            entry.kind.to_string(),
            Self::modified(entry),
            entry.size.to_string(),
            extension,
        ]
    }

    fn modified(entry: &DirectoryEntry) -> String {
        DateTime::<Local>::from(entry.modified)
            .format(MODIFIED_FORMAT)
            .to_string()
    }

    fn entry_to_json(entry: &DirectoryEntry) -> Value {
        json!({
            "name": entry.name,
            "path": entry.path.to_string_lossy().to_string(),
            "type": entry.kind.as_str(),
            "modified": DateTime::<Local>::from(entry.modified).to_rfc3339(),
            "size": entry.size,
            "extension": entry.extension(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn entry(name: &str, kind: EntryKind, size: u64) -> DirectoryEntry {
        DirectoryEntry {
            path: PathBuf::from("/data").join(name),
            name: name.to_string(),
            kind,
            size,
            modified: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_render_table_contains_rows() {
        colored::control::set_override(false);
        let table = OutputFormatter::render_table(&[
            entry("report.PDF", EntryKind::File, 1024),
            entry("Books", EntryKind::Folder, 0),
        ]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[2].starts_with("report.PDF | file"));
        assert!(lines[2].ends_with("| 1024 | .pdf"));
        assert!(lines[3].starts_with("Books"));
        assert!(lines[3].contains("folder"));
    }

    #[test]
    fn test_entry_to_json() {
        let value = OutputFormatter::entry_to_json(&entry("a.TXT", EntryKind::File, 10));
        assert_eq!(value["name"], "a.TXT");
        assert_eq!(value["type"], "file");
        assert_eq!(value["size"], 10);
        assert_eq!(value["extension"], "txt");
    }
}
