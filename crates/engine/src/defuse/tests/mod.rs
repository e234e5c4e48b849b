use super::*;
use parsers::parse_java;
use std::collections::BTreeSet;


pub(crate) fn unit(code: &str) -> JavaUnit {
    parse_java(code, "<mem>").unwrap()
}

pub(crate) fn converged<'u>(unit: &'u JavaUnit) -> Analyzer<'u> {
    let mut analyzer = Analyzer::new(unit, &EngineConfig::default());
    analyzer.run_fixpoint().unwrap();
    analyzer
}

/// The fact whose statement text starts with `prefix`.
pub(crate) fn fact<'a>(analyzer: &'a Analyzer<'_>, prefix: &str) -> &'a StatementNode {
    let mut found: Vec<_> = analyzer
        .facts()
        .values()
        .filter(|f| f.code.starts_with(prefix))
        .collect();
    assert_eq!(found.len(), 1, "facts starting with {prefix:?}");
    found.remove(0)
}

pub(crate) fn names(set: &BTreeSet<String>) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}

#[test]
fn fields_are_canonicalized_with_this_prefix() {
    let unit = unit(
        r#"
class Counter {
  int count;
  void inc() { count = count + 1; }
  void reset() { this.count = 0; }
}
"#,
    );
    let analyzer = converged(&unit);
    let inc = fact(&analyzer, "count = count + 1;");
    assert_eq!(names(&inc.defs), vec!["$THIS.count"]);
    assert_eq!(names(&inc.uses), vec!["$THIS.count"]);
    assert_eq!(names(&inc.self_flows), vec!["$THIS.count"]);
    assert_eq!(inc.normalized.as_deref(), Some("(count $ASSIGN (count $ADD $INT))"));
    let reset = fact(&analyzer, "this.count = 0;");
    assert_eq!(names(&reset.defs), vec!["$THIS.count"]);
    assert!(reset.uses.is_empty());
    let sigs = analyzer.signatures();
    assert!(sigs.iter().all(|s| s.mutates_state));
}

#[test]
fn locals_shadow_fields_and_scopes_close() {
    let unit = unit(
        r#"
class S {
  int total;
  int m(int a) {
    int b = a * 2, c;
    for (int i = 0; i < b; i++) { c = i; }
    return b + total;
  }
}
"#,
    );
    let analyzer = converged(&unit);
    let decl = fact(&analyzer, "int b = a * 2, c;");
    assert_eq!(decl.normalized.as_deref(), Some("$VAR b $INIT (a $MUL $INT), $VAR c"));
    assert_eq!(names(&decl.defs), vec!["b"]);
    assert_eq!(names(&decl.uses), vec!["a"]);
    let init = fact(&analyzer, "int i = 0");
    assert_eq!(names(&init.defs), vec!["i"]);
    let update = fact(&analyzer, "i++");
    assert_eq!(names(&update.defs), vec!["i"]);
    assert_eq!(names(&update.self_flows), vec!["i"]);
    let ret = fact(&analyzer, "return b + total;");
    assert_eq!(names(&ret.uses), vec!["$THIS.total", "b"]);
}

#[test]
fn unresolved_names_are_dropped() {
    let unit = unit("class U { void m() { y = z; } }");
    let analyzer = converged(&unit);
    let stmt = fact(&analyzer, "y = z;");
    assert!(stmt.defs.is_empty());
    assert!(stmt.uses.is_empty());
}

#[test]
fn parameters_define_their_names() {
    let unit = unit("class P { void m(int a, String... rest) { a = rest.length; } }");
    let analyzer = converged(&unit);
    let entry = unit_entry_key(&unit);
    let params = analyzer.params(entry);
    let defs: Vec<_> = params.iter().flat_map(|p| p.defs.iter().cloned()).collect();
    assert_eq!(defs, vec!["a", "rest"]);
    assert!(params.iter().all(|p| p.kind == ir::NodeKind::Param));
    assert_eq!(params[1].prop("type"), Some("String"));
}

fn unit_entry_key(unit: &JavaUnit) -> ir::SyntaxId {
    let member = crate::members::members(unit).remove(0);
    unit.id(member.node).unwrap()
}

#[test]
fn second_run_changes_nothing() {
    let unit = unit(
        r#"
class Acc {
  int sum;
  void add(int v) { sum += v; }
  void run(Acc other) { other.add(1); add(2); }
}
"#,
    );
    let mut analyzer = converged(&unit);
    let before = analyzer.facts().clone();
    let sigs = analyzer.signatures().to_vec();
    assert_eq!(analyzer.run_fixpoint().unwrap(), 1);
    assert_eq!(analyzer.facts(), &before);
    assert_eq!(analyzer.signatures(), sigs.as_slice());
}

// `run` is visited before `Box.fill` is known to mutate its receiver, so
// the definition of `b` only appears in the second pass.
const LATE_MUTATION: &str = r#"
class User {
  void run() {
    Box b = new Box();
    b.fill(3);
  }
}
class Box {
  int v;
  void fill(int x) { v = x; }
}
"#;

#[test]
fn facts_grow_until_fixpoint() {
    let unit = unit(LATE_MUTATION);
    let analyzer = converged(&unit);
    assert_eq!(analyzer.iterations(), 3);
    let call = fact(&analyzer, "b.fill(3);");
    assert_eq!(names(&call.defs), vec!["b"]);
    assert_eq!(names(&call.self_flows), vec!["b"]);
}

#[test]
fn iteration_cap_is_an_error() {
    let unit = unit(LATE_MUTATION);
    let mut analyzer = Analyzer::new(&unit, &EngineConfig { max_iterations: 1 });
    let err = analyzer.run_fixpoint().unwrap_err();
    assert!(err.to_string().contains("did not converge"), "{err}");
}

// Two passes change facts here; the third only confirms.
#[test]
fn iteration_cap_does_not_count_the_confirming_pass() {
    let unit = unit(LATE_MUTATION);
    let mut analyzer = Analyzer::new(&unit, &EngineConfig { max_iterations: 2 });
    assert_eq!(analyzer.run_fixpoint().unwrap(), 3);
}

#[test]
fn usable_expressions() {
    for expr in ["x", "this.x", "a.b.c"] {
        assert!(is_usable(expr), "{expr}");
    }
    for expr in ["", "$INT", "f(x)", "a[i]", "{ a,  }", "x++", "i--", "-x", "!b", "~m", "+y"] {
        assert!(!is_usable(expr), "{expr}");
    }
}
