use parsers::{detect_type, parse_file, ParserMetrics};
use std::fs;
use tempfile::tempdir;

#[test]
fn parses_files_and_counts_them() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("Good.java");
    let broken = dir.path().join("Broken.java");
    fs::write(&good, "package a; class Good { int f() { return 1; } }").unwrap();
    fs::write(&broken, "class Broken { void m( { }").unwrap();

    let mut metrics = ParserMetrics::default();
    let unit = parse_file(&good, Some(&mut metrics)).unwrap();
    assert_eq!(unit.package(), Some("a"));
    assert!(!unit.has_errors());

    let unit = parse_file(&broken, Some(&mut metrics)).unwrap();
    assert!(unit.has_errors());

    assert_eq!(metrics.files_parsed, 2);
    assert_eq!(metrics.parse_errors, 1);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let mut metrics = ParserMetrics::default();
    let err = parse_file(&dir.path().join("Nope.java"), Some(&mut metrics)).unwrap_err();
    assert!(err.to_string().contains("Failed to read file"));
    assert_eq!(metrics.parse_errors, 1);
    assert_eq!(metrics.files_parsed, 0);
}

#[test]
fn only_java_sources_are_detected() {
    assert_eq!(detect_type("Main.JAVA".as_ref()), Some("java"));
    assert_eq!(detect_type("Main.kt".as_ref()), None);
    assert_eq!(detect_type("Makefile".as_ref()), None);
}

#[test]
fn type_helpers_are_reachable_from_the_crate_root() {
    let unit = parsers::parse_java(
        "class T { void m(Map<String, List<Integer>> a, int... rest) {} }",
        "T.java",
    )
    .unwrap();
    let mut stack = vec![unit.root()];
    let mut method = None;
    while let Some(node) = stack.pop() {
        if node.kind() == "method_declaration" {
            method = Some(node);
            break;
        }
        let mut cursor = node.walk();
        stack.extend(node.named_children(&mut cursor));
    }
    let method = method.expect("method declaration");
    let params = method.child_by_field_name("parameters").unwrap();
    assert_eq!(
        parsers::param_types(&unit, params),
        vec!["Map<String,List<Integer>>", "int"]
    );
    let ret = method.child_by_field_name("type").unwrap();
    assert_eq!(parsers::type_text(&unit, ret), "void");
}
