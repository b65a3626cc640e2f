//! Flattening of sequence tries into one shared transition table.
//!
//! The runtime reads two parallel arrays of 16-bit cells, `symbols` and
//! `links`. A state is addressed by the index of its first cell:
//!
//! - Branch: header `(0, n + 1)` followed by `n` edge cells
//!   `(key, target)` sorted by key, so the runtime can binary-search them.
//! - Character leaf: a single cell `(c, 1)` for a BMP character other than
//!   U+0000 and U+FFFF, which would read as headers.
//! - String leaf: header `(0xFFFF, u + 1)` followed by the `u` UTF-16 code
//!   units of the output as `(unit, 0)`.
//!
//! Index 0 holds a no-op cell `(1, 1)` so that every entry point is non-zero.
//! All sets share the array and a cache of leaves keyed by output, so two
//! sequences producing the same string point at the same leaf.
//!
//! Inside the compiler, cells are the tagged [`Cell`] type; they are only
//! flattened into the two arrays by [`Automaton::table`].

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CompileError, Result};
use crate::trie::{Node, NodeId, Trie};

/// `symbol` of a branch header.
pub const BRANCH_HEADER: u16 = 0;
/// `symbol` of a string leaf header, `-1` as a signed 16-bit cell.
pub const STRING_HEADER: u16 = 0xFFFF;

/// One cell of the table, tagged by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// The reserved cell at index 0.
    Noop,
    /// Header of a branch with `children` edge cells after it.
    Branch { children: u16 },
    /// Transition on `symbol` to the state at `target`.
    Edge { symbol: u16, target: u16 },
    /// Leaf producing one character.
    Char(u16),
    /// Header of a leaf producing `units` UTF-16 code units.
    Str { units: u16 },
    /// Payload of a string leaf.
    Unit(u16),
}

impl Cell {
    pub fn symbol(self) -> u16 {
        match self {
            Cell::Noop => 1,
            Cell::Branch { .. } => BRANCH_HEADER,
            Cell::Edge { symbol, .. } => symbol,
            Cell::Char(c) => c,
            Cell::Str { .. } => STRING_HEADER,
            Cell::Unit(unit) => unit,
        }
    }

    pub fn link(self) -> u16 {
        match self {
            Cell::Noop => 1,
            Cell::Branch { children } => children + 1,
            Cell::Edge { target, .. } => target,
            Cell::Char(_) => 1,
            Cell::Str { units } => units + 1,
            Cell::Unit(_) => 0,
        }
    }
}

/// Compiled table with named entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    cells: Vec<Cell>,
    entry_points: BTreeMap<String, u16>,
    shared_leaves: usize,
}

impl Automaton {
    /// Flatten every trie, in name order, into one table.
    pub fn compile(sets: &BTreeMap<String, Trie>) -> Result<Self> {
        let mut builder = Builder {
            cells: vec![Cell::Noop],
            leaves: AHashMap::new(),
            shared_leaves: 0,
        };

        let mut entry_points = BTreeMap::new();
        for (name, trie) in sets {
            let root = builder.emit_node(trie, Trie::ROOT)?;
            tracing::debug!(set = %name, root, "emitted sequence set");
            entry_points.insert(name.clone(), root);
        }

        if builder.cells.len() > usize::from(u16::MAX) + 1 {
            return Err(CompileError::AutomatonTooLarge {
                cells: builder.cells.len(),
            });
        }

        Ok(Self {
            cells: builder.cells,
            entry_points,
            shared_leaves: builder.shared_leaves,
        })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn entry_points(&self) -> &BTreeMap<String, u16> {
        &self.entry_points
    }

    pub fn entry_point(&self, name: &str) -> Option<u16> {
        self.entry_points.get(name).copied()
    }

    /// How many leaf references were served from the output cache.
    pub fn shared_leaves(&self) -> usize {
        self.shared_leaves
    }

    /// Flatten the cells into the runtime's two parallel arrays.
    pub fn table(&self) -> AutomatonTable {
        AutomatonTable {
            entry_points: self.entry_points.clone(),
            symbols: self.cells.iter().map(|c| c.symbol()).collect(),
            links: self.cells.iter().map(|c| c.link()).collect(),
        }
    }
}

struct Builder<'t> {
    cells: Vec<Cell>,
    leaves: AHashMap<&'t str, u16>,
    shared_leaves: usize,
}

impl<'t> Builder<'t> {
    /// Index the next pushed cell will get.
    fn next_index(&self) -> Result<u16> {
        u16::try_from(self.cells.len()).map_err(|_| CompileError::AutomatonTooLarge {
            cells: self.cells.len(),
        })
    }

    fn emit_node(&mut self, trie: &'t Trie, id: NodeId) -> Result<u16> {
        match trie.node(id) {
            Node::Leaf(output) => self.emit_leaf(output),
            Node::Branch(children) => {
                let header = self.next_index()?;
                let count = fits_length(children.len(), self.cells.len())?;
                self.cells.push(Cell::Branch { children: count });

                // Reserve the edge cells, targets are patched below
                let first_edge = self.cells.len();
                for &c in children.keys() {
                    let symbol = key_cell(c)?;
                    self.cells.push(Cell::Edge { symbol, target: 0 });
                }

                for (i, &child) in children.values().enumerate() {
                    let target = self.emit_node(trie, child)?;
                    if let Cell::Edge { target: slot, .. } = &mut self.cells[first_edge + i] {
                        *slot = target;
                    }
                }
                Ok(header)
            }
        }
    }

    fn emit_leaf(&mut self, output: &'t str) -> Result<u16> {
        if let Some(&index) = self.leaves.get(output) {
            self.shared_leaves += 1;
            return Ok(index);
        }

        let index = self.next_index()?;
        match single_char_leaf(output) {
            Some(c) => self.cells.push(Cell::Char(c)),
            None => {
                let units: Vec<u16> = output.encode_utf16().collect();
                let count = fits_length(units.len(), self.cells.len())?;
                self.cells.push(Cell::Str { units: count });
                self.cells.extend(units.into_iter().map(Cell::Unit));
            }
        }
        self.leaves.insert(output, index);
        Ok(index)
    }
}

/// The cell value of an output that can use the single-cell leaf form.
fn single_char_leaf(output: &str) -> Option<u16> {
    let mut chars = output.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => u16::try_from(u32::from(c))
            .ok()
            .filter(|&v| v != BRANCH_HEADER && v != STRING_HEADER),
        _ => None,
    }
}

fn key_cell(c: char) -> Result<u16> {
    u16::try_from(u32::from(c)).map_err(|_| CompileError::SymbolOutOfRange(u32::from(c)))
}

/// Lengths are stored plus one in a 16-bit link.
fn fits_length(len: usize, cells: usize) -> Result<u16> {
    u16::try_from(len)
        .ok()
        .filter(|&n| n < u16::MAX)
        .ok_or(CompileError::AutomatonTooLarge { cells: cells + len })
}

/// Result of feeding one key to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The sequence continues in the branch at this index.
    Pending(u16),
    /// The sequence is complete.
    Output(String),
}

/// The flat form handed to emitters: two parallel arrays plus entry points.
///
/// Also implements the runtime's lookup so compiled tables can be checked
/// and inspected without the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonTable {
    pub entry_points: BTreeMap<String, u16>,
    pub symbols: Vec<u16>,
    pub links: Vec<u16>,
}

impl AutomatonTable {
    /// Feed `c` to the branch at `state`. Returns `None` when `state` is not
    /// a branch or has no edge for `c`.
    pub fn step(&self, state: u16, c: char) -> Option<Step> {
        let key = u16::try_from(u32::from(c)).ok()?;
        let s = usize::from(state);
        if *self.symbols.get(s)? != BRANCH_HEADER {
            return None;
        }
        let len = usize::from(*self.links.get(s)?);
        let edges = self.symbols.get(s + 1..s + len)?;
        let i = edges.binary_search(&key).ok()?;
        let next = *self.links.get(s + 1 + i)?;
        self.decode(next)
    }

    fn decode(&self, state: u16) -> Option<Step> {
        let s = usize::from(state);
        match *self.symbols.get(s)? {
            BRANCH_HEADER => Some(Step::Pending(state)),
            STRING_HEADER => {
                let len = usize::from(*self.links.get(s)?);
                let units = self.symbols.get(s + 1..s + len)?;
                String::from_utf16(units).ok().map(Step::Output)
            }
            c => char::from_u32(u32::from(c)).map(|c| Step::Output(c.to_string())),
        }
    }

    /// Walk `seq` from the entry point of `set`. Only a leaf reached on the
    /// last key counts as a match.
    pub fn lookup(&self, set: &str, seq: &[char]) -> Option<String> {
        let mut state = *self.entry_points.get(set)?;
        for (i, &c) in seq.iter().enumerate() {
            match self.step(state, c)? {
                Step::Pending(next) => state = next,
                Step::Output(output) => return (i + 1 == seq.len()).then_some(output),
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
