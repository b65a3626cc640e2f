// core/src/emit/java.rs
//
// Java source unit consumed by the keyboard runtime. Both arrays are built
// from string literals: a `char[]` initializer with one element per cell
// would exceed the class file limits for a full compose table.

use std::collections::BTreeMap;

use crate::automaton::AutomatonTable;
use crate::config::Config;
use crate::error::{CompileError, Result};

use super::Emitter;

/// Cells per string literal line.
const CELLS_PER_LINE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaEmitter {
    package: Option<String>,
    class_name: String,
}

impl JavaEmitter {
    pub fn new<S: Into<String>>(class_name: S) -> Self {
        Self {
            package: None,
            class_name: class_name.into(),
        }
    }

    pub fn with_package<S: Into<String>>(mut self, package: S) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            package: config.java.package.clone(),
            class_name: config.java.class_name.clone(),
        }
    }
}

impl Emitter for JavaEmitter {
    fn render(&self, table: &AutomatonTable) -> Result<Vec<u8>> {
        let constants = constant_names(table)?;

        let mut out = String::new();
        if let Some(package) = &self.package {
            out.push_str(&format!("package {package};\n\n"));
        }
        out.push_str("/** This file is generated by compile_compose. Do not edit. */\n\n");
        out.push_str(&format!("public final class {}\n{{\n", self.class_name));

        write_array(&mut out, "states", &table.symbols, true);
        out.push('\n');
        write_array(&mut out, "edges", &table.links, false);

        if !table.entry_points.is_empty() {
            out.push('\n');
        }
        for (ident, index) in constants {
            out.push_str(&format!("  public static final int {ident} = {index};\n"));
        }
        out.push_str("}\n");
        Ok(out.into_bytes())
    }
}

/// Constant name and index of every entry point, in set order.
fn constant_names(table: &AutomatonTable) -> Result<Vec<(String, u16)>> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut constants = Vec::with_capacity(table.entry_points.len());
    for (name, &index) in &table.entry_points {
        let ident = java_identifier(name);
        if let Some(first) = seen.insert(ident.clone(), name) {
            return Err(CompileError::DuplicateIdentifier {
                identifier: ident,
                first: first.to_string(),
                second: name.clone(),
            });
        }
        constants.push((ident, index));
    }
    Ok(constants)
}

fn write_array(out: &mut String, name: &str, cells: &[u16], printable: bool) {
    out.push_str(&format!("  public static final char[] {name} =\n    (\""));
    for (i, &cell) in cells.iter().enumerate() {
        if i > 0 && i % CELLS_PER_LINE == 0 {
            out.push_str("\" +\n     \"");
        }
        escape_cell(out, cell, printable);
    }
    out.push_str("\").toCharArray();\n");
}

/// Append one cell as Java string literal content.
///
/// Unicode escapes are translated before the Java lexer runs, so the quote,
/// backslash and line terminators must use their character escapes.
pub fn escape_cell(out: &mut String, cell: u16, printable: bool) {
    match cell {
        0x22 => out.push_str("\\\""),
        0x5C => out.push_str("\\\\"),
        0x0A => out.push_str("\\n"),
        0x0D => out.push_str("\\r"),
        0x20..=0x7E if printable => out.push(char::from(cell as u8)),
        _ => out.push_str(&format!("\\u{cell:04x}")),
    }
}

/// Constant name of an entry point: the set name upper-cased, with anything
/// that is not an ASCII letter or digit replaced by `_`.
pub fn java_identifier(set: &str) -> String {
    let mut ident: String = set
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if ident.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(cell: u16, printable: bool) -> String {
        let mut out = String::new();
        escape_cell(&mut out, cell, printable);
        out
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escaped('a' as u16, true), "a");
        assert_eq!(escaped('a' as u16, false), "\\u0061");
        assert_eq!(escaped('"' as u16, false), "\\\"");
        assert_eq!(escaped('\\' as u16, true), "\\\\");
        assert_eq!(escaped('\n' as u16, true), "\\n");
        assert_eq!(escaped('\r' as u16, false), "\\r");
        assert_eq!(escaped(0, true), "\\u0000");
        assert_eq!(escaped(0xFFFF, true), "\\uffff");
        assert_eq!(escaped(0xE9, true), "\\u00e9");
    }

    #[test]
    fn test_java_identifier() {
        assert_eq!(java_identifier("compose"), "COMPOSE");
        assert_eq!(java_identifier("accent_aigu"), "ACCENT_AIGU");
        assert_eq!(java_identifier("shift-arrows"), "SHIFT_ARROWS");
        assert_eq!(java_identifier("2nd"), "_2ND");
    }

    #[test]
    fn test_render_layout() {
        let table = AutomatonTable {
            entry_points: BTreeMap::from([("compose".to_string(), 1)]),
            symbols: vec![1, 0, 'a' as u16, '"' as u16],
            links: vec![1, 2, 3, 1],
        };
        let java = JavaEmitter::new("ComposeKeyData")
            .with_package("juloo.keyboard2")
            .render(&table)
            .unwrap();
        let java = String::from_utf8(java).unwrap();

        assert!(java.starts_with("package juloo.keyboard2;\n"));
        assert!(java.contains("public final class ComposeKeyData\n{\n"));
        assert!(java.contains("  public static final char[] states =\n    (\"\\u0001\\u0000a\\\"\").toCharArray();\n"));
        assert!(java.contains("  public static final char[] edges =\n    (\"\\u0001\\u0002\\u0003\\u0001\").toCharArray();\n"));
        assert!(java.contains("  public static final int COMPOSE = 1;\n"));
        assert!(java.ends_with("}\n"));
    }

    #[test]
    fn test_colliding_constant_names_are_fatal() {
        let table = AutomatonTable {
            entry_points: BTreeMap::from([("a-b".to_string(), 1), ("a_b".to_string(), 2)]),
            symbols: vec![1, 'x' as u16, 'y' as u16],
            links: vec![1, 1, 1],
        };
        let err = JavaEmitter::new("T").render(&table).unwrap_err();
        match err {
            CompileError::DuplicateIdentifier {
                identifier,
                first,
                second,
            } => {
                assert_eq!(identifier, "A_B");
                assert_eq!(first, "a-b");
                assert_eq!(second, "a_b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_long_arrays_are_split_into_lines() {
        let table = AutomatonTable {
            entry_points: BTreeMap::new(),
            symbols: vec!['x' as u16; CELLS_PER_LINE + 1],
            links: vec![1; CELLS_PER_LINE + 1],
        };
        let java = String::from_utf8(JavaEmitter::new("T").render(&table).unwrap()).unwrap();
        let first = "x".repeat(CELLS_PER_LINE);
        assert!(java.contains(&format!("(\"{first}\" +\n     \"x\").toCharArray();")));
    }
}
