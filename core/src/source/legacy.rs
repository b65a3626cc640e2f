//! Line-oriented X11 compose definitions.
//!
//! ```text
//! <Multi_key> <apostrophe> <e> : "é" eacute # LATIN SMALL LETTER E WITH ACUTE
//! ```
//!
//! Only lines starting with the trigger are sequences. The optional word
//! after the output names the output's first character; those names are
//! collected in a first pass over the file so every sequence line can use
//! them, wherever they are declared.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::{SequenceEntry, SequenceSource};
use crate::diagnostics::{Diagnostics, DropReason};
use crate::symbols::SymbolTable;

static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^((?:\s*<[^>]+>)+)\s*:\s*"((?:[^"\\]+|\\.)+)"\s*([^\s#]\S*)?\s*(?:#.*)?$"#)
        .expect("valid compose line regex")
});

static KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(?:U([0-9a-fA-F]{4,6})|([^>]+))>").expect("valid compose key regex"));

/// Parser for `.pre` / `.compose` files.
#[derive(Debug, Clone)]
pub struct LegacySource {
    symbols: SymbolTable,
    trigger: String,
}

impl LegacySource {
    pub fn new(symbols: SymbolTable, trigger: &str) -> Self {
        Self {
            symbols,
            trigger: trigger.to_string(),
        }
    }

    /// Names bound by the file itself. The first binding of a name wins.
    fn local_names(&self, text: &str) -> SymbolTable {
        let mut names: HashMap<&str, char> = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            let body = line.strip_prefix(self.trigger.as_str()).unwrap_or(line);
            let Some(caps) = LINE.captures(body) else {
                continue;
            };
            let (Some(name), Some(first)) = (caps.get(3), unescape(&caps[2]).chars().next()) else {
                continue;
            };
            names.entry(name.as_str()).or_insert(first);
        }

        let mut table = SymbolTable::new();
        for (name, c) in names {
            table.insert(name, c);
        }
        table
    }

    fn parse_keys(&self, symbols: &SymbolTable, keys: &str) -> Result<Vec<char>, DropReason> {
        KEY.captures_iter(keys)
            .map(|caps| {
                let c = match (caps.get(1), caps.get(2)) {
                    (Some(hex), _) => {
                        let raw = hex.as_str();
                        u32::from_str_radix(raw, 16)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or_else(|| DropReason::InvalidCodePoint(raw.to_string()))?
                    }
                    (None, Some(name)) => symbols
                        .resolve(name.as_str())
                        .ok_or_else(|| DropReason::UnknownSymbol(name.as_str().to_string()))?,
                    (None, None) => unreachable!("key regex has two alternatives"),
                };
                if u32::from(c) > 0xFFFF {
                    return Err(DropReason::OutOfRange(u32::from(c)));
                }
                Ok(c)
            })
            .collect()
    }
}

impl SequenceSource for LegacySource {
    fn parse(&self, label: &str, text: &str, diag: &mut Diagnostics) -> Vec<SequenceEntry> {
        let symbols = self.symbols.merged(&self.local_names(text));

        let mut entries = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let Some(body) = line.trim().strip_prefix(self.trigger.as_str()) else {
                continue;
            };
            let lineno = i + 1;
            let Some(caps) = LINE.captures(body) else {
                diag.drop_sequence(format!("{label}:{lineno}: malformed line"));
                continue;
            };
            match self.parse_keys(&symbols, &caps[1]) {
                Ok(sequence) => entries.push(SequenceEntry::new(sequence, unescape(&caps[2]))),
                Err(reason) => diag.drop_sequence(format!("{label}:{lineno}: {reason}")),
            }
        }
        entries
    }
}

/// Undo the quoting of an output. A lone escaped character stands for
/// itself; in longer outputs only `\"` and `\\` are escapes.
fn unescape(raw: &str) -> String {
    let mut chars = raw.chars();
    if let (Some('\\'), Some(c), None) = (chars.next(), chars.next(), chars.next()) {
        return c.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next == '"' || next == '\\' => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
