//! Nested JSON mappings with line comments.
//!
//! ```text
//! {
//!   // acute accent
//!   "e": "é",
//!   "o": { "e": "œ" }
//! }
//! ```
//!
//! Every key is one key press; string values end a sequence, objects
//! continue it. Any other value makes the whole file unusable.

use serde_json::{Map, Value};

use super::{SequenceEntry, SequenceSource};
use crate::diagnostics::{Diagnostics, DropReason};
use crate::trie::render_sequence;

/// Parser for `.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedSource;

impl SequenceSource for NestedSource {
    fn parse(&self, label: &str, text: &str, diag: &mut Diagnostics) -> Vec<SequenceEntry> {
        let root = match serde_json::from_str::<Value>(&strip_comments(text)) {
            Ok(Value::Object(root)) => root,
            Ok(_) => {
                diag.skip_file(format!("{label}: skipped, top level is not an object"));
                return Vec::new();
            }
            Err(e) => {
                diag.skip_file(format!("{label}: skipped, {e}"));
                return Vec::new();
            }
        };
        if let Err(path) = check_shape(&root, &mut Vec::new()) {
            diag.skip_file(format!(
                "{label}: skipped, value at '{}' is neither a string nor an object",
                render_sequence(&path)
            ));
            return Vec::new();
        }

        let mut entries = Vec::new();
        collect(label, &root, &mut Vec::new(), &mut entries, diag);
        entries
    }
}

/// Find the first value that is neither a string nor an object.
fn check_shape(map: &Map<String, Value>, path: &mut Vec<char>) -> Result<(), Vec<char>> {
    for (key, value) in map {
        path.extend(key.chars());
        match value {
            Value::String(_) => {}
            Value::Object(children) => check_shape(children, path)?,
            _ => return Err(path.clone()),
        }
        path.truncate(path.len() - key.chars().count());
    }
    Ok(())
}

fn collect(
    label: &str,
    map: &Map<String, Value>,
    path: &mut Vec<char>,
    out: &mut Vec<SequenceEntry>,
    diag: &mut Diagnostics,
) {
    for (key, value) in map {
        let c = match single_key(key) {
            Ok(c) => c,
            Err(reason) => {
                // Every sequence below this key is unusable
                for _ in 0..count_leaves(value) {
                    diag.drop_sequence(format!(
                        "{label}: after '{}': {reason}",
                        render_sequence(path)
                    ));
                }
                continue;
            }
        };

        path.push(c);
        match value {
            Value::String(output) if output.is_empty() => diag.drop_sequence(format!(
                "{label}: '{}': {}",
                render_sequence(path),
                DropReason::EmptyOutput
            )),
            Value::String(output) => out.push(SequenceEntry::new(path.clone(), output.as_str())),
            Value::Object(children) => collect(label, children, path, out, diag),
            _ => {}
        }
        path.pop();
    }
}

fn single_key(key: &str) -> Result<char, DropReason> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if u32::from(c) > 0xFFFF => Err(DropReason::OutOfRange(u32::from(c))),
        (Some(c), None) => Ok(c),
        _ => Err(DropReason::NotSingleChar(key.to_string())),
    }
}

fn count_leaves(value: &Value) -> usize {
    match value {
        Value::Object(children) => children.values().map(count_leaves).sum(),
        _ => 1,
    }
}

/// Remove `//` comments, leaving string literals intact.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.next_if(|&next| next != '\n').is_some() {}
            }
            _ => out.push(c),
        }
    }
    out
}
