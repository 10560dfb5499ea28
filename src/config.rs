//! User configuration for grouping and renaming defaults.
//!
//! Settings are loaded from a TOML file and only provide defaults; anything
//! given on the command line takes precedence.
//!
//! # Configuration File Format
//!
//! ```toml
//! [group]
//! date_format = "D-M-Y"
//!
//! [group.mappings]
//! jpg = "Images"
//! pdf = "Documents"
//!
//! [rename]
//! separator = "_"
//! numerator_start = 1
//! zero_pad = 0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".filelynxrc.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {source}", .path.display())]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub group: GroupSettings,
    #[serde(default)]
    pub rename: RenameSettings,
}

/// Defaults for the `groupby` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSettings {
    /// Date folder format in the human wildcard syntax (`D-M-Y`).
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Extension → folder name mappings.
    #[serde(default)]
    pub mappings: HashMap<String, String>,
}

/// Defaults for the `batchrename` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameSettings {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_numerator_start")]
    pub numerator_start: i64,
    #[serde(default)]
    pub zero_pad: i32,
}

fn default_date_format() -> String {
    "D-M-Y".to_string()
}

fn default_separator() -> String {
    "_".to_string()
}

fn default_numerator_start() -> i64 {
    1
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            mappings: HashMap::new(),
        }
    }
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            numerator_start: default_numerator_start(),
            zero_pad: 0,
        }
    }
}

impl Settings {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.filelynxrc.toml` in the current directory
    /// 3. Look for `~/.config/filelynx/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("filelynx")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Mappings with lowercased, trimmed keys and trimmed folder names.
    pub fn normalized_mappings(&self) -> HashMap<String, String> {
        self.group
            .mappings
            .iter()
            .map(|(ext, folder)| (ext.trim().to_lowercase(), folder.trim().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.group.date_format, "D-M-Y");
        assert!(settings.group.mappings.is_empty());
        assert_eq!(settings.rename.separator, "_");
        assert_eq!(settings.rename.numerator_start, 1);
        assert_eq!(settings.rename.zero_pad, 0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [rename]
            zero_pad = 4
            "#,
        )
        .unwrap();

        assert_eq!(settings.rename.zero_pad, 4);
        assert_eq!(settings.rename.separator, "_");
        assert_eq!(settings.group, GroupSettings::default());
    }

    #[test]
    fn test_mappings_are_normalized() {
        let settings: Settings = toml::from_str(
            r#"
            [group.mappings]
            JPG = " Images "
            "#,
        )
        .unwrap();

        let mappings = settings.normalized_mappings();
        assert_eq!(mappings.get("jpg"), Some(&"Images".to_string()));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[group]\ndate_format = \"Y.M\"\n").expect("Failed to write config");

        let settings = Settings::load(Some(&path)).expect("Failed to load config");
        assert_eq!(settings.group.date_format, "Y.M");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Settings::load(Some(Path::new("/non/existent/filelynx.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[rename]\nzero_pad = \"wide\"\n").expect("Failed to write config");

        let result = Settings::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ConfigInvalid { .. })));
    }
}
