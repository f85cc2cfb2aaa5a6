//! Build configuration.
//!
//! Read from `sqldoc.toml`:
//!
//! ```toml
//! include_table_attributes = false
//! source = "sql"
//! output = "docs/objects.rst"
//! format = "rst"
//! title = "Database Objects"
//! ```
//!
//! Lookup order: explicit path, `./sqldoc.toml`, then
//! `<config dir>/sqldoc/config.toml`. Missing files fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SqlDocError, SqlDocResult};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "sqldoc.toml";

/// Output format of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// reStructuredText sections
    #[default]
    Rst,
    /// Section tree and descriptors as JSON
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocConfig {
    /// Extract column lists from table DDL.
    pub include_table_attributes: bool,
    /// Directory searched for `.sql` files.
    pub source: Option<PathBuf>,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Document title written above the object sections.
    pub title: Option<String>,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            include_table_attributes: true,
            source: None,
            output: None,
            format: OutputFormat::Rst,
            title: None,
        }
    }
}

impl DocConfig {
    /// Parse a config from TOML text.
    pub fn parse(content: &str) -> SqlDocResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config from a file.
    pub fn from_file(path: &Path) -> SqlDocResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SqlDocError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load the first config found, or the defaults.
    ///
    /// An explicit path that does not exist is an error; the implicit
    /// locations are optional.
    pub fn load(explicit: Option<&Path>) -> SqlDocResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SqlDocError::Config(format!(
                    "Config file '{}' not found",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        for candidate in Self::default_locations() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading config");
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqldoc").join("config.toml"));
        }
        paths
    }
}
