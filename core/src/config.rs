//! Compiler configuration.
//!
//! Every field has a default, so a TOML file only needs to mention what it
//! changes:
//!
//! ```toml
//! primary_set = "compose"
//! keysyms = "srcs/compose/keysymdef.h"
//! format = "java"
//!
//! [java]
//! package = "org.example.keyboard"
//! class_name = "ComposeKeyData"
//! ```
//!
//! # Example
//!
//! ```rust
//! use compose_core::{Config, EmitFormat};
//!
//! let config = Config::from_toml_str("format = \"json\"").unwrap();
//! assert_eq!(config.format, EmitFormat::Json);
//! assert_eq!(config.primary_set, "compose");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CompileError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Token that starts every relevant line of a legacy compose file.
    pub trigger: String,

    /// Set checked by the case-consistency linter.
    pub primary_set: String,
    /// Lint every set instead of only `primary_set`.
    pub lint_all_sets: bool,

    /// File name of the symbol-table resource inside a directory bundle.
    pub symbol_resource: String,
    /// Global base symbol table applied to every input.
    pub keysyms: Option<PathBuf>,

    /// Cap on individually logged trie conflicts per set. Counting is not capped.
    pub max_reported_conflicts: usize,

    /// Walk every accepted sequence through the finished table.
    pub verify: bool,

    /// Output artifact format.
    pub format: EmitFormat,
    pub java: JavaConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger: "<Multi_key>".to_string(),
            primary_set: "compose".to_string(),
            lint_all_sets: false,
            symbol_resource: "keysymdef.h".to_string(),
            keysyms: None,
            max_reported_conflicts: 10,
            verify: true,
            format: EmitFormat::Java,
            java: JavaConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Names of the sets the linter should visit, given the sets that exist.
    pub fn lint_targets<'s>(&self, sets: impl Iterator<Item = &'s str>) -> Vec<&'s str> {
        if self.lint_all_sets {
            sets.collect()
        } else {
            sets.filter(|name| *name == self.primary_set).collect()
        }
    }
}

/// Settings for the Java source emitter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JavaConfig {
    /// Package declaration, omitted when unset.
    pub package: Option<String>,
    pub class_name: String,
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            package: None,
            class_name: "ComposeKeyData".to_string(),
        }
    }
}

/// Supported artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitFormat {
    Java,
    Json,
    Bincode,
}

impl FromStr for EmitFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(EmitFormat::Java),
            "json" => Ok(EmitFormat::Json),
            "bincode" | "bin" => Ok(EmitFormat::Bincode),
            other => Err(format!(
                "unsupported format: {other}. Use 'java', 'json' or 'bincode'"
            )),
        }
    }
}

impl fmt::Display for EmitFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmitFormat::Java => "java",
            EmitFormat::Json => "json",
            EmitFormat::Bincode => "bincode",
        })
    }
}
