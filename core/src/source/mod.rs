//! Readers for sequence definition sources.
//!
//! Every format implements [`SequenceSource`] and produces a flat list of
//! [`SequenceEntry`]. Problems with single sequences, and with whole
//! nested-mapping files, are recorded in [`Diagnostics`] and never returned
//! as errors. Only I/O failures and unknown formats are fatal.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::{CompileError, Result};
use crate::symbols::SymbolTable;

pub mod legacy;
pub mod nested;

pub use legacy::LegacySource;
pub use nested::NestedSource;

/// One parsed `keys -> output` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    /// Keys after the compose trigger. Every element fits in 16 bits.
    pub sequence: Vec<char>,
    pub output: String,
}

impl SequenceEntry {
    pub fn new<S: Into<String>>(sequence: Vec<char>, output: S) -> Self {
        Self {
            sequence,
            output: output.into(),
        }
    }
}

/// Common contract of the source formats.
pub trait SequenceSource {
    /// Parse `text`. `label` names the input in diagnostics.
    fn parse(&self, label: &str, text: &str, diag: &mut Diagnostics) -> Vec<SequenceEntry>;
}

/// Source formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Line-oriented X11 compose definitions (`.pre`, `.compose`).
    Legacy,
    /// Nested JSON mapping (`.json`).
    Nested,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext.to_ascii_lowercase().as_str() {
            "pre" | "compose" => Some(SourceFormat::Legacy),
            "json" => Some(SourceFormat::Nested),
            _ => None,
        }
    }
}

/// Sequences read from one command-line input.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// Sequence set the entries belong to.
    pub set: String,
    pub entries: Vec<SequenceEntry>,
}

/// Set name of an input: the file stem, or the directory name for bundles.
pub fn set_name(path: &Path) -> Result<String> {
    let name = if path.is_dir() {
        path.file_name()
    } else {
        path.file_stem()
    };
    name.and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CompileError::UnnamedInput {
            path: path.to_path_buf(),
        })
}

/// Read a file or a directory bundle.
///
/// `symbols` is the base table; bundles layer their own symbol resource on
/// top of it before parsing any of their sequence files.
pub fn load_input(
    path: &Path,
    symbols: &SymbolTable,
    config: &Config,
    diag: &mut Diagnostics,
) -> Result<LoadedInput> {
    let set = set_name(path)?;
    let entries = if path.is_dir() {
        load_bundle(path, symbols, config, diag)?
    } else {
        let format = SourceFormat::detect(path).ok_or_else(|| CompileError::UnknownFormat {
            path: path.to_path_buf(),
        })?;
        load_file(path, format, symbols, config, diag)?
    };
    tracing::debug!(set = %set, sequences = entries.len(), "loaded {}", path.display());
    Ok(LoadedInput { set, entries })
}

fn load_file(
    path: &Path,
    format: SourceFormat,
    symbols: &SymbolTable,
    config: &Config,
    diag: &mut Diagnostics,
) -> Result<Vec<SequenceEntry>> {
    let text = read_to_string(path)?;
    let label = path.display().to_string();
    let entries = match format {
        SourceFormat::Legacy => {
            LegacySource::new(symbols.clone(), &config.trigger).parse(&label, &text, diag)
        }
        SourceFormat::Nested => NestedSource.parse(&label, &text, diag),
    };
    Ok(entries)
}

fn load_bundle(
    dir: &Path,
    symbols: &SymbolTable,
    config: &Config,
    diag: &mut Diagnostics,
) -> Result<Vec<SequenceEntry>> {
    let bundle_err = |source: std::io::Error| CompileError::Bundle {
        path: dir.to_path_buf(),
        source,
    };
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(bundle_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .map_err(bundle_err)?;
    files.retain(|p| p.is_file());
    files.sort();

    // The symbol resource applies to every sequence file of the bundle
    let resource = files
        .iter()
        .position(|p| p.file_name().and_then(|s| s.to_str()) == Some(config.symbol_resource.as_str()));
    let symbols = match resource {
        Some(i) => {
            let local = SymbolTable::parse_keysymdef(&read_to_string(&files.remove(i))?);
            tracing::debug!(symbols = local.len(), "bundle {} has its own symbol table", dir.display());
            symbols.merged(&local)
        }
        None => symbols.clone(),
    };

    let mut entries = Vec::new();
    for file in &files {
        match SourceFormat::detect(file) {
            Some(format) => entries.extend(load_file(file, format, &symbols, config, diag)?),
            None => tracing::debug!("skipping {} in bundle", file.display()),
        }
    }
    Ok(entries)
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
