//! Case-consistency checks over two-letter sequences.
//!
//! For every pair of uppercase ASCII letters `C1 C2` with a definition, the
//! capitalized form `C1 c2` is expected to exist and agree with it. A missing
//! capitalized form is acceptable when the all-lowercase form `c1 c2`
//! produces the same output, since the runtime would fall back to it; that
//! case is reported as a note instead of a warning.

use crate::diagnostics::Diagnostics;
use crate::trie::Trie;

/// Lint the set `name`. Only reads the trie and only records advisories.
pub fn lint_case_consistency(name: &str, trie: &Trie, diag: &mut Diagnostics) {
    for c1 in 'A'..='Z' {
        for c2 in 'A'..='Z' {
            let l1 = c1.to_ascii_lowercase();
            let l2 = c2.to_ascii_lowercase();

            let Some(upper) = trie.lookup(&[c1, c2]) else {
                continue;
            };
            let capitalized = trie.lookup(&[c1, l2]);
            let lower = trie.lookup(&[l1, l2]);

            match capitalized {
                None if lower == Some(upper) => diag.note(format!(
                    "{name}: '{c1}{l2}' is undefined, falls back to '{l1}{l2}' -> {upper}"
                )),
                None => diag.warn(format!(
                    "{name}: '{c1}{c2}' -> {upper} but '{c1}{l2}' is undefined{}",
                    match lower {
                        Some(lower) => format!(" and '{l1}{l2}' -> {lower}"),
                        None => String::new(),
                    }
                )),
                Some(capitalized) if capitalized != upper => diag.warn(format!(
                    "{name}: '{c1}{c2}' -> {upper} but '{c1}{l2}' -> {capitalized}"
                )),
                Some(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn trie_of(entries: &[(&str, &str)]) -> Trie {
        let mut trie = Trie::new();
        for (keys, output) in entries {
            let keys: Vec<char> = keys.chars().collect();
            trie.insert(&keys, output).unwrap();
        }
        trie
    }

    #[test]
    fn test_missing_capitalized_with_different_lowercase_warns() {
        let trie = trie_of(&[("AB", "X"), ("ab", "y")]);
        let mut diag = Diagnostics::new();
        lint_case_consistency("compose", &trie, &mut diag);

        assert_eq!(diag.warnings(), 1);
        assert_eq!(diag.notes(), 0);
        let msg = &diag.messages_of(Severity::Warning).next().unwrap().message;
        assert!(msg.contains("'Ab' is undefined"), "{msg}");
    }

    #[test]
    fn test_missing_capitalized_with_same_lowercase_is_a_note() {
        let trie = trie_of(&[("AE", "Æ"), ("ae", "Æ")]);
        let mut diag = Diagnostics::new();
        lint_case_consistency("compose", &trie, &mut diag);

        assert_eq!(diag.warnings(), 0);
        assert_eq!(diag.notes(), 1);
    }

    #[test]
    fn test_mismatching_capitalized_warns() {
        let trie = trie_of(&[("OE", "Œ"), ("Oe", "œ"), ("oe", "œ")]);
        let mut diag = Diagnostics::new();
        lint_case_consistency("compose", &trie, &mut diag);

        assert_eq!(diag.warnings(), 1);
    }

    #[test]
    fn test_single_key_lowercase_beside_uppercase_pair() {
        let trie = trie_of(&[("AB", "X"), ("a", "á")]);
        let mut diag = Diagnostics::new();
        lint_case_consistency("compose", &trie, &mut diag);

        assert_eq!(diag.warnings(), 1);
        let msg = &diag.messages_of(Severity::Warning).next().unwrap().message;
        assert_eq!(msg, "compose: 'AB' -> X but 'Ab' is undefined");
    }

    #[test]
    fn test_consistent_set_is_clean() {
        let trie = trie_of(&[("OE", "Œ"), ("Oe", "Œ"), ("oe", "œ"), ("'e", "é")]);
        let mut diag = Diagnostics::new();
        lint_case_consistency("compose", &trie, &mut diag);

        assert_eq!(diag.warnings(), 0);
        assert_eq!(diag.notes(), 0);
        assert_eq!(diag.dropped(), 0);
    }
}
