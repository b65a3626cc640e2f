//! compose-core
//!
//! Compiler from compose sequence definitions to the flat 16-bit transition
//! table read by the keyboard runtime.
//!
//! Pipeline: [`source`] parsers produce `(sequence, output)` pairs, the
//! [`Compiler`] inserts them into one [`Trie`] per sequence set, [`lint`]
//! checks the primary set, [`Automaton::compile`] flattens every set into one
//! shared table, and an [`Emitter`] renders the result.
//!
//! Public API:
//! - `Compiler` / `compile_paths` - Drive a run over input files and bundles
//! - `SymbolTable` - Symbolic key names to characters
//! - `Trie` - One prefix-code sequence set
//! - `Automaton` / `AutomatonTable` - The compiled table and its reference interpreter
//! - `Emitter` - Java, JSON and bincode renderers
//! - `Config` - Configuration loaded from TOML
//! - `Diagnostics` - Counters and messages of a run
//!
//! # Example
//! ```
//! use compose_core::{Compiler, Config, SequenceEntry, SymbolTable};
//!
//! let mut compiler = Compiler::with_symbols(Config::default(), SymbolTable::builtin());
//! compiler.add_entries("compose", vec![SequenceEntry::new(vec!['\'', 'e'], "é")]);
//! let compilation = compiler.finish().unwrap();
//!
//! assert_eq!(compilation.table.lookup("compose", &['\'', 'e']).as_deref(), Some("é"));
//! assert_eq!(compilation.report.accepted, 1);
//! ```

pub mod automaton;
pub use automaton::{Automaton, AutomatonTable, Cell, Step};

pub mod compiler;
pub use compiler::{compile_paths, Compilation, Compiler, Report};

pub mod config;
pub use config::{Config, EmitFormat, JavaConfig};

pub mod diagnostics;
pub use diagnostics::{Diagnostic, Diagnostics, DropReason, Severity};

pub mod emit;
pub use emit::{emitter_for, BincodeEmitter, Emitter, JavaEmitter, JsonEmitter};

pub mod error;
pub use error::{CompileError, Result};

pub mod lint;
pub use lint::lint_case_consistency;

pub mod source;
pub use source::{load_input, SequenceEntry, SequenceSource, SourceFormat};

pub mod symbols;
pub use symbols::SymbolTable;

pub mod trie;
pub use trie::{Conflict, ConflictKind, Trie};
