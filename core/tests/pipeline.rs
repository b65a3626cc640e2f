// core/tests/pipeline.rs
//
// End-to-end runs over real files and directory bundles.
//
// Tests cover:
// - Legacy and nested sources compiled into separate sets
// - Bundles with their own keysymdef.h
// - Fatal versus recoverable input problems
// - Byte-identical output across runs and argument orders

use compose_core::{
    compile_paths, emitter_for, CompileError, Compiler, Config, EmitFormat, Severity, Step,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const COMPOSE_PRE: &str = r#"
# Latin
<Multi_key> <apostrophe> <e> : "é" eacute
<Multi_key> <apostrophe> <E> : "É" Eacute
<Multi_key> <o> <e> : "œ"
<Multi_key> <O> <E> : "Œ"
<Multi_key> <O> <e> : "Œ"
<Multi_key> <s> <s> : "ß"
<Multi_key> <colon> <parenright> : "😀"
<Multi_key> <e> <e> : "é"
"#;

const ACCENT_JSON: &str = r#"{
  // aigu
  "e": "é",
  "E": "É",
  "a": "á"
}"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn fixture() -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let compose = write(dir.path(), "compose.pre", COMPOSE_PRE);
    let accent = write(dir.path(), "accent_aigu.json", ACCENT_JSON);
    (dir, vec![compose, accent])
}

#[test]
fn compiles_legacy_and_nested_sets() {
    let (_dir, paths) = fixture();
    let compilation = compile_paths(Config::default(), &paths).unwrap();
    let table = &compilation.table;

    assert_eq!(table.entry_points.keys().collect::<Vec<_>>(), vec!["accent_aigu", "compose"]);
    assert_eq!(table.lookup("compose", &['\'', 'e']).as_deref(), Some("é"));
    assert_eq!(table.lookup("compose", &['O', 'e']).as_deref(), Some("Œ"));
    assert_eq!(table.lookup("compose", &[':', ')']).as_deref(), Some("😀"));
    assert_eq!(table.lookup("accent_aigu", &['a']).as_deref(), Some("á"));
    // Sets are independent
    assert_eq!(table.lookup("accent_aigu", &['\'', 'e']), None);

    let report = compilation.report;
    assert_eq!(report.parsed, 11);
    assert_eq!(report.accepted, 11);
    assert_eq!(report.dropped, 0);
    assert_eq!(report.entry_points, 2);
    // Repeated outputs reuse the first leaf: "é" twice, "É" and "Œ" once
    assert_eq!(report.shared_leaves, 4);
}

#[test]
fn string_leaf_for_surrogate_pair() {
    let (_dir, paths) = fixture();
    let table = compile_paths(Config::default(), &paths).unwrap().table;

    let root = table.entry_points["compose"];
    let Some(Step::Pending(colon)) = table.step(root, ':') else {
        panic!("':' should continue the sequence");
    };
    let s = usize::from(colon);
    let leaf = usize::from(table.links[s + 1]);
    assert_eq!(table.symbols[leaf], 0xFFFF);
    assert_eq!(table.links[leaf], 3);
    assert_eq!(&table.symbols[leaf + 1..leaf + 3], &[0xD83D, 0xDE00]);
}

#[test]
fn linter_runs_on_primary_set_only() {
    let (_dir, paths) = fixture();
    let compilation = compile_paths(Config::default(), &paths).unwrap();

    // 'OE' and 'Oe' agree; no other uppercase pairs exist
    assert_eq!(compilation.report.warnings, 0);
    assert_eq!(compilation.diagnostics.messages_of(Severity::Warning).count(), 0);
}

#[test]
fn bundle_uses_its_own_symbol_resource() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = dir.path().join("greek");
    fs::create_dir(&bundle).unwrap();
    write(
        &bundle,
        "keysymdef.h",
        "#define XK_Greek_alpha 0x07e1  /* U+03B1 GREEK SMALL LETTER ALPHA */\n",
    );
    write(&bundle, "a.pre", "<Multi_key> <Greek_alpha> <i> : \"ᾳ\"\n");
    write(&bundle, "b.json", r#"{ "g": { "a": "α" } }"#);
    write(&bundle, "README.txt", "not a sequence file\n");

    let compilation = compile_paths(Config::default(), &[&bundle]).unwrap();
    let table = &compilation.table;

    assert!(table.entry_points.contains_key("greek"));
    assert_eq!(table.lookup("greek", &['α', 'i']).as_deref(), Some("ᾳ"));
    assert_eq!(table.lookup("greek", &['g', 'a']).as_deref(), Some("α"));
    assert_eq!(compilation.report.dropped, 0);
}

#[test]
fn global_keysyms_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let keysyms = write(
        dir.path(),
        "keysymdef.h",
        "#define XK_dead_acute 0xfe51  /*(U+0301 COMBINING ACUTE ACCENT)*/\n",
    );
    let input = write(dir.path(), "compose.pre", "<Multi_key> <dead_acute> <e> : \"é\"\n");

    let mut config = Config::default();
    config.keysyms = Some(keysyms);
    let table = compile_paths(config, &[input]).unwrap().table;
    assert_eq!(table.lookup("compose", &['\u{301}', 'e']).as_deref(), Some("é"));
}

#[test]
fn unresolvable_keys_are_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "compose.pre",
        "<Multi_key> <dead_acute> <e> : \"é\"\n<Multi_key> <U1F600> : \"x\"\n<Multi_key> <a> <a> : \"å\"\n",
    );

    let compilation = compile_paths(Config::default(), &[input]).unwrap();
    assert_eq!(compilation.report.parsed, 1);
    assert_eq!(compilation.report.dropped, 2);
    assert_eq!(compilation.table.lookup("compose", &['a', 'a']).as_deref(), Some("å"));
}

#[test]
fn malformed_nested_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write(dir.path(), "bad.json", "{ \"a\": [1, 2] }");
    let good = write(dir.path(), "good.json", "{ \"a\": \"b\" }");

    let compilation = compile_paths(Config::default(), &[bad, good]).unwrap();
    // The skipped file still gets an empty entry point
    assert!(compilation.table.entry_points.contains_key("bad"));
    assert_eq!(compilation.table.lookup("good", &['a']).as_deref(), Some("b"));
    assert_eq!(compilation.diagnostics.messages_of(Severity::Dropped).count(), 1);
}

#[test]
fn unknown_format_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "compose.txt", "");

    let err = compile_paths(Config::default(), &[input]).unwrap_err();
    assert!(matches!(err, CompileError::UnknownFormat { .. }), "{err}");
}

#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pre");

    let mut compiler = Compiler::new(Config::default()).unwrap();
    let err = compiler.add_input(&missing).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }), "{err}");
}

#[test]
fn output_is_deterministic() {
    let (_dir, paths) = fixture();
    let mut reversed = paths.clone();
    reversed.reverse();

    for format in [EmitFormat::Java, EmitFormat::Json, EmitFormat::Bincode] {
        let mut config = Config::default();
        config.format = format;
        let emitter = emitter_for(&config);

        let first = compile_paths(config.clone(), &paths).unwrap().render(&*emitter).unwrap();
        let second = compile_paths(config.clone(), &reversed).unwrap().render(&*emitter).unwrap();
        assert_eq!(first, second, "{format} output differs between runs");
    }
}
