//! Symbolic key names.
//!
//! A [`SymbolTable`] maps names such as `dead_acute` or `quotedbl` to the
//! single character a key produces. Tables are layered: the builtin ASCII
//! names, then any `keysymdef.h` resource, then the aliases a legacy source
//! file declares for itself. Each layer shadows the ones below it.

use once_cell::sync::Lazy;
use phf::phf_map;
use regex::Regex;
use std::collections::HashMap;

/// X11 keysym names for printable ASCII. Letters and digits are named by
/// themselves and are handled as literal single-character names.
static BUILTIN_KEYSYMS: phf::Map<&'static str, char> = phf_map! {
    "space" => ' ',
    "exclam" => '!',
    "quotedbl" => '"',
    "numbersign" => '#',
    "dollar" => '$',
    "percent" => '%',
    "ampersand" => '&',
    "apostrophe" => '\'',
    "quoteright" => '\'',
    "parenleft" => '(',
    "parenright" => ')',
    "asterisk" => '*',
    "plus" => '+',
    "comma" => ',',
    "minus" => '-',
    "period" => '.',
    "slash" => '/',
    "colon" => ':',
    "semicolon" => ';',
    "less" => '<',
    "equal" => '=',
    "greater" => '>',
    "question" => '?',
    "at" => '@',
    "bracketleft" => '[',
    "backslash" => '\\',
    "bracketright" => ']',
    "asciicircum" => '^',
    "underscore" => '_',
    "grave" => '`',
    "quoteleft" => '`',
    "braceleft" => '{',
    "bar" => '|',
    "braceright" => '}',
    "asciitilde" => '~',
};

/// `#define XK_<name> 0x.... /* U+XXXX NAME */`; deprecated entries use
/// `/*(U+XXXX NAME)*/`, hence the single wildcard before `U+`.
static KEYSYM_DEFINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#define XK_(\S+)\s+\S+\s*/\*.U\+([0-9a-fA-F]+)\s").expect("valid keysym regex")
});

/// Immutable-once-built mapping from symbolic key name to character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    names: HashMap<String, char>,
}

impl SymbolTable {
    /// An empty table. Only single-character names resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the builtin ASCII keysym names.
    pub fn builtin() -> Self {
        let names = BUILTIN_KEYSYMS
            .entries()
            .map(|(name, c)| (name.to_string(), *c))
            .collect();
        Self { names }
    }

    /// Parse a `keysymdef.h`-style resource. Lines that do not carry a
    /// Unicode annotation are ignored.
    pub fn parse_keysymdef(text: &str) -> Self {
        let mut names = HashMap::new();
        for line in text.lines() {
            let Some(caps) = KEYSYM_DEFINE.captures(line) else {
                continue;
            };
            let c = u32::from_str_radix(&caps[2], 16)
                .ok()
                .and_then(char::from_u32);
            if let Some(c) = c {
                names.insert(caps[1].to_string(), c);
            }
        }
        Self { names }
    }

    /// A new table where the entries of `overrides` shadow ours.
    pub fn merged(&self, overrides: &SymbolTable) -> Self {
        let mut names = self.names.clone();
        names.extend(overrides.names.iter().map(|(k, v)| (k.clone(), *v)));
        Self { names }
    }

    /// Bind `name` to `c`, replacing any previous binding.
    pub fn insert<N: Into<String>>(&mut self, name: N, c: char) {
        self.names.insert(name.into(), c);
    }

    /// Resolve a symbolic name. A name made of exactly one character
    /// resolves to that character unless the table binds it explicitly.
    pub fn resolve(&self, name: &str) -> Option<char> {
        if let Some(c) = self.names.get(name) {
            return Some(*c);
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYSYMDEF: &str = "\
#define XK_space                         0x0020  /* U+0020 SPACE */
#define XK_dead_grave                    0xfe50
#define XK_eacute                        0x00e9  /* U+00E9 LATIN SMALL LETTER E WITH ACUTE */
#define XK_quoteright                    0x0027  /* deprecated */
#define XK_Greek_alpha                   0x07e1  /* U+03B1 GREEK SMALL LETTER ALPHA */
#define XK_guillemotleft                 0x00ab  /*(U+00AB LEFT-POINTING DOUBLE ANGLE QUOTATION MARK)*/
";

    #[test]
    fn test_parse_keysymdef() {
        let table = SymbolTable::parse_keysymdef(KEYSYMDEF);
        assert_eq!(table.len(), 4);
        assert_eq!(table.resolve("eacute"), Some('é'));
        assert_eq!(table.resolve("Greek_alpha"), Some('α'));
        assert_eq!(table.resolve("guillemotleft"), Some('«'));
        // No Unicode annotation
        assert_eq!(table.resolve("dead_grave"), None);
    }

    #[test]
    fn test_builtin_names() {
        let table = SymbolTable::builtin();
        assert_eq!(table.resolve("quotedbl"), Some('"'));
        assert_eq!(table.resolve("asciitilde"), Some('~'));
        assert_eq!(table.resolve("backslash"), Some('\\'));
    }

    #[test]
    fn test_single_char_names_resolve_to_themselves() {
        let table = SymbolTable::new();
        assert_eq!(table.resolve("a"), Some('a'));
        assert_eq!(table.resolve("é"), Some('é'));
        assert_eq!(table.resolve("ab"), None);
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn test_merged_shadows_base() {
        let base = SymbolTable::builtin();
        let mut local = SymbolTable::new();
        local.insert("space", '\u{a0}');
        local.insert("A", 'Å');

        let merged = base.merged(&local);
        assert_eq!(merged.resolve("space"), Some('\u{a0}'));
        assert_eq!(merged.resolve("A"), Some('Å'));
        assert_eq!(merged.resolve("comma"), Some(','));
        // The base is untouched
        assert_eq!(base.resolve("space"), Some(' '));
    }
}
