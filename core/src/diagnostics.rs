//! Counters and messages accumulated while compiling.
//!
//! Every component takes a `&mut Diagnostics` instead of touching global
//! state. Recording a message also emits a `tracing` event so the binary's
//! subscriber sees it as it happens.

use std::fmt;

/// How serious a recorded message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Advisory remark that needs no action.
    Note,
    /// Advisory problem that does not change the output.
    Warning,
    /// A sequence or file was left out of the output.
    Dropped,
}

/// A single human-readable diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Dropped => "dropped",
        };
        write!(f, "{tag}: {}", self.message)
    }
}

/// Why a single sequence was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// A `<name>` key could not be resolved through the symbol table.
    UnknownSymbol(String),
    /// A key does not fit in a 16-bit cell.
    OutOfRange(u32),
    /// A `<UXXXX>` reference is not a Unicode scalar value.
    InvalidCodePoint(String),
    /// A nested-mapping key is not exactly one character.
    NotSingleChar(String),
    /// The output string is empty.
    EmptyOutput,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::UnknownSymbol(name) => write!(f, "unknown symbol <{name}>"),
            DropReason::OutOfRange(cp) => write!(f, "key U+{cp:04X} out of 16-bit range"),
            DropReason::InvalidCodePoint(raw) => write!(f, "invalid code point <U{raw}>"),
            DropReason::NotSingleChar(key) => write!(f, "key {key:?} is not a single character"),
            DropReason::EmptyOutput => f.write_str("empty output"),
        }
    }
}

/// Accumulator threaded through the whole pipeline.
#[derive(Debug, Default)]
pub struct Diagnostics {
    parsed: usize,
    dropped: usize,
    warnings: usize,
    notes: usize,
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `n` sequences successfully produced by a parser.
    pub fn add_parsed(&mut self, n: usize) {
        self.parsed += n;
    }

    /// Record a sequence dropped while parsing. Logged at debug level.
    pub fn drop_sequence(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{message}");
        self.dropped += 1;
        self.push(Severity::Dropped, message);
    }

    /// Record a sequence rejected by the trie.
    pub fn reject(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.dropped += 1;
        self.push(Severity::Dropped, message);
    }

    /// Count a dropped sequence without keeping a message for it.
    pub fn drop_sequence_silently(&mut self) {
        self.dropped += 1;
    }

    /// Record a file skipped as a whole. This does not touch the sequence counters.
    pub fn skip_file(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.push(Severity::Dropped, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings += 1;
        self.push(Severity::Warning, message);
    }

    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.notes += 1;
        self.push(Severity::Note, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.messages.push(Diagnostic { severity, message });
    }

    pub fn parsed(&self) -> usize {
        self.parsed
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn notes(&self) -> usize {
        self.notes
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// Messages of one severity, in the order they were recorded.
    pub fn messages_of(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.messages.iter().filter(move |d| d.severity == severity)
    }
}
