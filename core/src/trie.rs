//! Prefix trie holding one sequence set.
//!
//! Nodes live in an arena and refer to each other by index. A node is either
//! a branch (ordered map from the next key to a child) or a leaf carrying the
//! output. The sequences of one trie always form a prefix code: no accepted
//! sequence is a strict prefix of another, so a leaf never has children.
//!
//! # Example
//! ```
//! use compose_core::trie::{ConflictKind, Trie};
//!
//! let mut trie = Trie::new();
//! trie.insert(&['\'', 'e'], "é").unwrap();
//!
//! assert_eq!(trie.lookup(&['\'', 'e']), Some("é"));
//! assert_eq!(trie.lookup(&['\'']), None); // prefix, not a sequence
//!
//! let err = trie.insert(&['\''], "'").unwrap_err();
//! assert_eq!(err.kind, ConflictKind::LongerExists);
//! ```
use std::collections::BTreeMap;
use std::fmt;

/// Index of a node in a [`Trie`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Children ordered by key.
    Branch(BTreeMap<char, NodeId>),
    Leaf(String),
}

/// Why an insertion was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A shorter sequence already ends on the path of the new one.
    ShorterExists,
    /// The exact sequence is already defined.
    Duplicate,
    /// The new sequence is a strict prefix of existing ones.
    LongerExists,
    /// Sequences need at least one key.
    Empty,
}

/// A rejected insertion, with the existing definition it collides with
/// already rendered for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub existing: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ConflictKind::ShorterExists => "shorter sequence",
            ConflictKind::Duplicate => "duplicate of",
            ConflictKind::LongerExists => "prefix of",
            ConflictKind::Empty => return f.write_str("empty sequence"),
        };
        write!(f, "{what} '{}'", self.existing)
    }
}

/// Render a key sequence for messages.
pub fn render_sequence(seq: &[char]) -> String {
    seq.iter().collect()
}

#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    sequences: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub const ROOT: NodeId = 0;

    /// Create a trie with an empty root branch.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Branch(BTreeMap::new())],
            sequences: 0,
        }
    }

    /// Insert `seq -> output`, keeping the prefix-code invariant.
    ///
    /// Intermediate branches are created on demand. Walking into an existing
    /// leaf, or finding the final slot already taken by a leaf or a branch,
    /// rejects the insertion and leaves the trie unchanged.
    pub fn insert(&mut self, seq: &[char], output: &str) -> Result<(), Conflict> {
        let Some((&last, init)) = seq.split_last() else {
            return Err(Conflict {
                kind: ConflictKind::Empty,
                existing: String::new(),
            });
        };

        let mut node = Self::ROOT;
        for &c in init {
            let existing = self.children(node).get(&c).copied();
            node = match existing {
                Some(child) => {
                    if matches!(self.nodes[child], Node::Leaf(_)) {
                        return Err(self.conflict(ConflictKind::ShorterExists, seq));
                    }
                    child
                }
                None => {
                    let child = self.push(Node::Branch(BTreeMap::new()));
                    self.children_mut(node).insert(c, child);
                    child
                }
            };
        }

        if let Some(&child) = self.children(node).get(&last) {
            let kind = match self.nodes[child] {
                Node::Leaf(_) => ConflictKind::Duplicate,
                Node::Branch(_) => ConflictKind::LongerExists,
            };
            return Err(self.conflict(kind, seq));
        }

        let leaf = self.push(Node::Leaf(output.to_string()));
        self.children_mut(node).insert(last, leaf);
        self.sequences += 1;
        Ok(())
    }

    /// Output of `seq` if it is exactly an accepted sequence.
    pub fn lookup(&self, seq: &[char]) -> Option<&str> {
        let mut node = Self::ROOT;
        for &c in seq {
            match &self.nodes[node] {
                Node::Branch(children) => node = *children.get(&c)?,
                // Keys left over after a complete sequence
                Node::Leaf(_) => return None,
            }
        }
        match &self.nodes[node] {
            Node::Leaf(output) => Some(output),
            Node::Branch(_) => None,
        }
    }

    /// Render the existing definition that `seq` runs into: the leaf met on
    /// its path, or the first sequence under the node where it ends.
    pub fn describe_existing(&self, seq: &[char]) -> String {
        let mut keys = Vec::new();
        let mut node = Self::ROOT;
        for &c in seq {
            match &self.nodes[node] {
                Node::Leaf(_) => break,
                Node::Branch(children) => match children.get(&c) {
                    Some(&child) => {
                        keys.push(c);
                        node = child;
                    }
                    None => break,
                },
            }
        }
        // Descend to the first leaf so the message names a concrete sequence
        loop {
            match &self.nodes[node] {
                Node::Leaf(output) => {
                    return format!("{} -> {}", render_sequence(&keys), output);
                }
                Node::Branch(children) => match children.iter().next() {
                    Some((&c, &child)) => {
                        keys.push(c);
                        node = child;
                    }
                    None => return render_sequence(&keys),
                },
            }
        }
    }

    /// All accepted sequences in key order.
    pub fn entries(&self) -> Vec<(Vec<char>, &str)> {
        let mut out = Vec::with_capacity(self.sequences);
        let mut path = Vec::new();
        self.collect_entries(Self::ROOT, &mut path, &mut out);
        out
    }

    fn collect_entries<'s>(
        &'s self,
        node: NodeId,
        path: &mut Vec<char>,
        out: &mut Vec<(Vec<char>, &'s str)>,
    ) {
        match &self.nodes[node] {
            Node::Leaf(output) => out.push((path.clone(), output.as_str())),
            Node::Branch(children) => {
                for (&c, &child) in children {
                    path.push(c);
                    self.collect_entries(child, path, out);
                    path.pop();
                }
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of accepted sequences.
    pub fn len(&self) -> usize {
        self.sequences
    }

    pub fn is_empty(&self) -> bool {
        self.sequences == 0
    }

    fn conflict(&self, kind: ConflictKind, seq: &[char]) -> Conflict {
        Conflict {
            kind,
            existing: self.describe_existing(seq),
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn children(&self, id: NodeId) -> &BTreeMap<char, NodeId> {
        match &self.nodes[id] {
            Node::Branch(children) => children,
            Node::Leaf(_) => unreachable!("leaf nodes are never walked into"),
        }
    }

    fn children_mut(&mut self, id: NodeId) -> &mut BTreeMap<char, NodeId> {
        match &mut self.nodes[id] {
            Node::Branch(children) => children,
            Node::Leaf(_) => unreachable!("leaf nodes are never walked into"),
        }
    }
}
