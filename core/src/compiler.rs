// core/src/compiler.rs
//
// Drives one compiler run: inputs are parsed into one trie per sequence set,
// the primary set is linted, and the forest is flattened and verified.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::automaton::{Automaton, AutomatonTable};
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::emit::Emitter;
use crate::error::{CompileError, Result};
use crate::lint::lint_case_consistency;
use crate::source::{load_input, SequenceEntry};
use crate::symbols::SymbolTable;
use crate::trie::{render_sequence, Trie};

/// Summary counters of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Report {
    pub parsed: usize,
    pub accepted: usize,
    pub dropped: usize,
    pub cells: usize,
    pub entry_points: usize,
    pub shared_leaves: usize,
    pub warnings: usize,
    pub notes: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sequences parsed, {} accepted, {} dropped; {} cells, {} entry points, {} shared leaves; {} warnings, {} notes",
            self.parsed,
            self.accepted,
            self.dropped,
            self.cells,
            self.entry_points,
            self.shared_leaves,
            self.warnings,
            self.notes,
        )
    }
}

/// Everything a run produces.
#[derive(Debug)]
pub struct Compilation {
    pub automaton: Automaton,
    pub table: AutomatonTable,
    pub report: Report,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    pub fn render(&self, emitter: &dyn Emitter) -> Result<Vec<u8>> {
        emitter.render(&self.table)
    }
}

/// Accumulates sequence sets until [`Compiler::finish`].
#[derive(Debug)]
pub struct Compiler {
    config: Config,
    symbols: SymbolTable,
    sets: BTreeMap<String, Trie>,
    conflicts: BTreeMap<String, usize>,
    diag: Diagnostics,
}

impl Compiler {
    /// Create a compiler whose base symbol table is the builtin names, plus
    /// `config.keysyms` when set.
    pub fn new(config: Config) -> Result<Self> {
        let mut symbols = SymbolTable::builtin();
        if let Some(path) = &config.keysyms {
            let text = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
                path: path.clone(),
                source,
            })?;
            let keysyms = SymbolTable::parse_keysymdef(&text);
            tracing::debug!(symbols = keysyms.len(), "loaded {}", path.display());
            symbols = symbols.merged(&keysyms);
        }
        Ok(Self::with_symbols(config, symbols))
    }

    pub fn with_symbols(config: Config, symbols: SymbolTable) -> Self {
        Self {
            config,
            symbols,
            sets: BTreeMap::new(),
            conflicts: BTreeMap::new(),
            diag: Diagnostics::new(),
        }
    }

    /// Parse a file or bundle into the set named after it.
    pub fn add_input(&mut self, path: &Path) -> Result<usize> {
        let loaded = load_input(path, &self.symbols, &self.config, &mut self.diag)?;
        Ok(self.add_entries(&loaded.set, loaded.entries))
    }

    /// Insert parsed sequences into `set`, creating it if needed. Returns
    /// how many were accepted. Rejections are counted and, up to
    /// `max_reported_conflicts` per set, reported.
    pub fn add_entries(&mut self, set: &str, entries: Vec<SequenceEntry>) -> usize {
        self.diag.add_parsed(entries.len());
        let trie = self.sets.entry(set.to_string()).or_default();
        let conflicts = self.conflicts.entry(set.to_string()).or_default();

        let mut accepted = 0;
        for entry in entries {
            match trie.insert(&entry.sequence, &entry.output) {
                Ok(()) => accepted += 1,
                Err(conflict) => {
                    *conflicts += 1;
                    if *conflicts <= self.config.max_reported_conflicts {
                        self.diag.reject(format!(
                            "{set}: '{} -> {}' rejected, {conflict}",
                            render_sequence(&entry.sequence),
                            entry.output
                        ));
                    } else {
                        self.diag.drop_sequence_silently();
                    }
                }
            }
        }
        accepted
    }

    pub fn sets(&self) -> &BTreeMap<String, Trie> {
        &self.sets
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    /// Lint, flatten and verify.
    pub fn finish(mut self) -> Result<Compilation> {
        for (set, &count) in &self.conflicts {
            let cap = self.config.max_reported_conflicts;
            if count > cap {
                self.diag
                    .note(format!("{set}: {} more conflicts not shown", count - cap));
            }
        }

        let targets = self.config.lint_targets(self.sets.keys().map(String::as_str));
        if targets.is_empty() {
            tracing::debug!(primary = %self.config.primary_set, "no set to lint");
        }
        for name in targets {
            if let Some(trie) = self.sets.get(name) {
                lint_case_consistency(name, trie, &mut self.diag);
            }
        }

        let automaton = Automaton::compile(&self.sets)?;
        let table = automaton.table();
        if self.config.verify {
            verify(&self.sets, &table)?;
        }

        let report = Report {
            parsed: self.diag.parsed(),
            accepted: self.sets.values().map(Trie::len).sum(),
            dropped: self.diag.dropped(),
            cells: table.len(),
            entry_points: table.entry_points.len(),
            shared_leaves: automaton.shared_leaves(),
            warnings: self.diag.warnings(),
            notes: self.diag.notes(),
        };
        tracing::debug!("{report}");

        Ok(Compilation {
            automaton,
            table,
            report,
            diagnostics: self.diag,
        })
    }
}

/// Walk every accepted sequence through the table.
fn verify(sets: &BTreeMap<String, Trie>, table: &AutomatonTable) -> Result<()> {
    for (set, trie) in sets {
        for (sequence, expected) in trie.entries() {
            let actual = table.lookup(set, &sequence);
            if actual.as_deref() != Some(expected) {
                return Err(CompileError::Verification {
                    set: set.clone(),
                    sequence: render_sequence(&sequence),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }
    }
    tracing::debug!("verified every sequence against the table");
    Ok(())
}

/// Compile `paths` in sorted order with a fresh [`Compiler`].
pub fn compile_paths<P: AsRef<Path>>(config: Config, paths: &[P]) -> Result<Compilation> {
    let mut paths: Vec<&Path> = paths.iter().map(|p| p.as_ref()).collect();
    paths.sort();

    let mut compiler = Compiler::new(config)?;
    for path in paths {
        compiler.add_input(path)?;
    }
    compiler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keys: &str, output: &str) -> SequenceEntry {
        SequenceEntry::new(keys.chars().collect(), output)
    }

    #[test]
    fn test_duplicate_is_counted_once() {
        let mut compiler = Compiler::with_symbols(Config::default(), SymbolTable::builtin());
        let accepted = compiler.add_entries("compose", vec![entry("ab", "x"), entry("ab", "y")]);
        assert_eq!(accepted, 1);

        let compilation = compiler.finish().unwrap();
        assert_eq!(compilation.report.parsed, 2);
        assert_eq!(compilation.report.accepted, 1);
        assert_eq!(compilation.report.dropped, 1);
        assert_eq!(compilation.table.lookup("compose", &['a', 'b']).as_deref(), Some("x"));
    }

    #[test]
    fn test_conflict_reports_are_capped() {
        let mut config = Config::default();
        config.max_reported_conflicts = 2;
        let mut compiler = Compiler::with_symbols(config, SymbolTable::new());

        let mut entries = vec![entry("a", "x")];
        entries.extend(('b'..='f').map(|c| entry(&format!("a{c}"), "y")));
        compiler.add_entries("compose", entries);

        let compilation = compiler.finish().unwrap();
        let diag = &compilation.diagnostics;
        assert_eq!(diag.dropped(), 5);
        assert_eq!(diag.messages_of(crate::Severity::Dropped).count(), 2);
        assert!(diag
            .messages()
            .iter()
            .any(|m| m.message == "compose: 3 more conflicts not shown"));
    }

    #[test]
    fn test_only_primary_set_is_linted_by_default() {
        let mut compiler = Compiler::with_symbols(Config::default(), SymbolTable::new());
        compiler.add_entries("compose", vec![entry("AB", "X"), entry("ab", "y")]);
        compiler.add_entries("other", vec![entry("CD", "X"), entry("cd", "y")]);
        assert_eq!(compiler.finish().unwrap().report.warnings, 1);

        let mut config = Config::default();
        config.lint_all_sets = true;
        let mut compiler = Compiler::with_symbols(config, SymbolTable::new());
        compiler.add_entries("compose", vec![entry("AB", "X"), entry("ab", "y")]);
        compiler.add_entries("other", vec![entry("CD", "X"), entry("cd", "y")]);
        assert_eq!(compiler.finish().unwrap().report.warnings, 2);
    }

    #[test]
    fn test_lint_survives_single_key_sequences() {
        let mut compiler = Compiler::with_symbols(Config::default(), SymbolTable::new());
        compiler.add_entries("compose", vec![entry("AB", "X"), entry("a", "á")]);

        let compilation = compiler.finish().unwrap();
        assert_eq!(compilation.report.accepted, 2);
        assert_eq!(compilation.report.warnings, 1);
        assert_eq!(compilation.table.lookup("compose", &['a']).as_deref(), Some("á"));
    }

    #[test]
    fn test_report_display() {
        let report = Report {
            parsed: 3,
            accepted: 2,
            dropped: 1,
            ..Report::default()
        };
        assert!(report.to_string().starts_with("3 sequences parsed, 2 accepted, 1 dropped"));
    }
}
