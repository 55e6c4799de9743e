//! Configuration system for casequill.
//!
//! This module provides the configuration structure for casequill with sensible defaults
//! and support for serialization/deserialization via serde. Configuration is loaded
//! from a TOML file and may be overridden by command-line arguments.
//!
//! # Example
//!
//! ```
//! use casequill::config::Config;
//!
//! // Use default configuration
//! let config = Config::default();
//! assert_eq!(config.indent_size, 2);
//! assert_eq!(config.field_separator, ".");
//!
//! // Create custom configuration
//! let custom = Config {
//!     indent_size: 4,
//!     ..Config::default()
//! };
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the casequill application.
///
/// All fields have sensible defaults via `Config::default()`, and any field
/// missing from the config file takes its default.
///
/// # Fields
///
/// * `indent_size` - Spaces per indentation level in exported JSON (default: 2)
/// * `field_separator` - Separator between keys in field paths (default: ".")
/// * `export_filename` - File name used when exporting without an explicit path (default: "test_cases.json")
/// * `create_backup` - Create .bak files before overwriting an export (default: false)
/// * `sync_clipboard` - Copy exports to the system clipboard (default: true)
/// * `template` - Path to a custom default template (default: none, use the built-in one)
/// * `keep_one_case` - Never let the set become empty (default: false)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Spaces per indentation level in exported JSON
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Separator between keys in field paths
    #[serde(default = "default_field_separator")]
    pub field_separator: String,

    /// File name used for exports without an explicit path
    #[serde(default = "default_export_filename")]
    pub export_filename: String,

    /// Create .bak files before overwriting an export
    #[serde(default)]
    pub create_backup: bool,

    /// Copy exports to the system clipboard
    #[serde(default = "default_sync_clipboard")]
    pub sync_clipboard: bool,

    /// Custom template used to seed blank cases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,

    /// Keep at least one case: deleting the last one is refused and
    /// clearing leaves a single blank case
    #[serde(default)]
    pub keep_one_case: bool,
}

/// Returns the default indentation size.
fn default_indent_size() -> usize {
    2
}

/// Returns the default field path separator.
fn default_field_separator() -> String {
    ".".to_string()
}

/// Returns the default export file name.
fn default_export_filename() -> String {
    "test_cases.json".to_string()
}

/// Returns the default for clipboard sync.
fn default_sync_clipboard() -> bool {
    true
}

impl Default for Config {
    /// Creates a new configuration with default values.
    ///
    /// # Example
    ///
    /// ```
    /// use casequill::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.export_filename, "test_cases.json");
    /// assert!(config.sync_clipboard);
    /// assert!(!config.keep_one_case);
    /// ```
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            field_separator: default_field_separator(),
            export_filename: default_export_filename(),
            create_backup: false,
            sync_clipboard: default_sync_clipboard(),
            template: None,
            keep_one_case: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/casequill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("casequill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from a specific file, falling back to defaults.
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::debug!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to a specific file.
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}
