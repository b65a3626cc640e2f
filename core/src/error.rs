//! Fatal error types for the compose compiler.
//!
//! Only structural failures live here. Problems scoped to a single sequence or
//! a single nested-mapping file are recorded in [`Diagnostics`](crate::Diagnostics)
//! and never surface as a `CompileError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a compiler run.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A required input file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory bundle could not be listed.
    #[error("failed to read bundle directory {}: {source}", path.display())]
    Bundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input's extension does not name a known source format.
    #[error("unknown sequence source format: {}", path.display())]
    UnknownFormat { path: PathBuf },

    /// The input path has no usable basename to derive a set name from.
    #[error("cannot derive a sequence set name from {}", path.display())]
    UnnamedInput { path: PathBuf },

    /// The configuration file is not valid TOML for [`Config`](crate::Config).
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The flattened table does not fit in 16-bit cell indices.
    #[error("automaton needs {cells} cells, more than a 16-bit index can address")]
    AutomatonTooLarge { cells: usize },

    /// A sequence element reached the compiler outside of the 16-bit range.
    #[error("sequence element U+{0:04X} does not fit in a 16-bit cell")]
    SymbolOutOfRange(u32),

    /// The compiled table does not reproduce an accepted sequence.
    #[error("set '{set}': sequence '{sequence}' does not decode to '{expected}' (got {actual:?})")]
    Verification {
        set: String,
        sequence: String,
        expected: String,
        actual: Option<String>,
    },

    /// Two set names map to the same Java constant.
    #[error("sets '{first}' and '{second}' both map to the Java constant {identifier}")]
    DuplicateIdentifier {
        identifier: String,
        first: String,
        second: String,
    },

    /// JSON rendering failed.
    #[error("failed to render JSON table: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary rendering failed.
    #[error("failed to render binary table: {0}")]
    Bincode(#[from] bincode::Error),
}

/// A specialized `Result` type for compiler operations.
pub type Result<T> = std::result::Result<T, CompileError>;
