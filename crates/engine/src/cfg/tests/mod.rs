use super::*;
use parsers::parse_java;

mod exceptions;

pub(crate) fn graphs(code: &str) -> Vec<ControlFlowGraph> {
    let unit = parse_java(code, "<mem>").unwrap();
    build_cfg(&unit)
}

/// CFG of the only member of `code`.
pub(crate) fn single(code: &str) -> ControlFlowGraph {
    let mut all = graphs(code);
    assert_eq!(all.len(), 1, "expected one member");
    all.remove(0)
}

pub(crate) fn find(cfg: &ControlFlowGraph, prefix: &str) -> NodeId {
    cfg.nodes
        .iter()
        .position(|n| n.code.starts_with(prefix))
        .unwrap_or_else(|| panic!("no node starting with {prefix:?} in {}", cfg.to_dot()))
}

pub(crate) fn edge(cfg: &ControlFlowGraph, from: NodeId, to: NodeId) -> Option<ControlLabel> {
    cfg.out_edges(from).find(|e| e.target == to).map(|e| e.label)
}

#[test]
fn one_graph_per_member_including_initializers() {
    let all = graphs(
        r#"
class A {
  static { init(); }
  { x = 1; }
  A() {}
  void f() {}
  class B { void g() {} }
}
"#,
    );
    let names: Vec<_> = all.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["A.static@3", "A.block@4", "A.A()", "A.f()", "A.B.g()"]);
    assert_eq!(all[1].nodes[all[1].entry].code, "block");
    assert_eq!(all[1].nodes[all[1].entry].line, 0);
}

#[test]
fn nested_members_are_named_by_their_enclosing_classes() {
    let all = graphs(
        r#"
class Outer1 { class Inner { void run() {} } }
class Outer2 { class Inner { void run() {} } }
"#,
    );
    let names: Vec<_> = all.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Outer1.Inner.run()", "Outer2.Inner.run()"]);
    let entry = &all[0].nodes[all[0].entry];
    assert_eq!(entry.prop("class"), Some("Inner"));
}

#[test]
fn entry_is_unique_and_every_node_reachable() {
    let cfg = single(
        r#"
class T {
  int m(int x, String s) {
    int y = x;
    if (y > 0) { y = 1; }
    return y;
  }
}
"#,
    );
    let entry = &cfg.nodes[cfg.entry];
    assert_eq!(entry.kind, NodeKind::Entry);
    assert_eq!(entry.code, "int m(int x, String s)");
    assert_eq!(entry.prop("class"), Some("T"));
    assert_eq!(cfg.in_edges(cfg.entry).count(), 0);
    let entries = cfg.nodes.iter().filter(|n| n.kind == NodeKind::Entry).count();
    assert_eq!(entries, 1);
    assert!(cfg.reachable_from(cfg.entry).into_iter().all(|r| r));
}
