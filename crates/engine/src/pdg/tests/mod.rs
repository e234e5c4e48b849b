use super::*;
use ir::NodeKind;
use parsers::parse_java;

mod traversal;

fn pdgs(code: &str) -> Vec<ProgramDependenceGraph> {
    let unit = parse_java(code, "<mem>").unwrap();
    build_pdg(&unit).unwrap()
}

fn single(code: &str) -> ProgramDependenceGraph {
    let mut all = pdgs(code);
    assert_eq!(all.len(), 1);
    all.remove(0)
}

fn find(pdg: &ProgramDependenceGraph, prefix: &str) -> NodeId {
    pdg.nodes
        .iter()
        .position(|n| n.code.starts_with(prefix))
        .unwrap_or_else(|| panic!("no node starting with {prefix:?} in {}", pdg.to_dot()))
}

fn param(pdg: &ProgramDependenceGraph, name: &str) -> NodeId {
    pdg.params
        .iter()
        .copied()
        .find(|&p| pdg.nodes[p].prop("name") == Some(name))
        .unwrap_or_else(|| panic!("no parameter {name}"))
}

#[test]
fn redefinition_stops_propagation() {
    let pdg = single(
        r#"
class T {
  int m(int a) {
    int b = a + 1;
    int c = b * 2;
    b = 5;
    return b + c;
  }
}
"#,
    );
    let a = param(&pdg, "a");
    let b1 = find(&pdg, "int b = a + 1;");
    let c = find(&pdg, "int c = b * 2;");
    let b2 = find(&pdg, "b = 5;");
    let ret = find(&pdg, "return b + c;");
    assert!(pdg.has_data_edge(a, b1, "a"));
    assert!(pdg.has_data_edge(b1, c, "b"));
    assert!(pdg.has_data_edge(c, ret, "c"));
    assert!(pdg.has_data_edge(b2, ret, "b"));
    assert!(!pdg.has_data_edge(b1, ret, "b"));
    assert!(!pdg.has_data_edge(b1, b2, "b"));
    assert_eq!(pdg.data_edges().count(), 4);
}

#[test]
fn loop_carried_values_get_self_loops() {
    let pdg = single(
        r#"
class T {
  int m(int n) {
    int s = 0;
    for (int i = 0; i < n; i++) {
      s = s + i;
    }
    return s;
  }
}
"#,
    );
    let n = param(&pdg, "n");
    let s0 = find(&pdg, "int s = 0;");
    let head = find(&pdg, "for (i < n)");
    let body = find(&pdg, "s = s + i;");
    let update = find(&pdg, "i++");
    let ret = find(&pdg, "return s;");
    let init = find(&pdg, "int i = 0");
    assert!(pdg.has_data_edge(n, head, "n"));
    assert!(pdg.has_data_edge(body, body, "s"));
    assert!(pdg.has_data_edge(update, update, "i"));
    assert!(pdg.has_data_edge(s0, body, "s"));
    assert!(pdg.has_data_edge(s0, ret, "s"));
    assert!(pdg.has_data_edge(body, ret, "s"));
    assert!(pdg.has_data_edge(init, head, "i"));
    assert!(pdg.has_data_edge(init, body, "i"));
    assert!(pdg.has_data_edge(update, head, "i"));
    assert!(pdg.has_data_edge(update, body, "i"));
}

#[test]
fn parameters_reach_uses_along_unmodified_paths() {
    let pdg = single(
        r#"
class T {
  void m(int x) {
    if (x > 0) {
      x = 0;
    }
    int y = x;
  }
}
"#,
    );
    let x = param(&pdg, "x");
    let cond = find(&pdg, "if (x > 0)");
    let reset = find(&pdg, "x = 0;");
    let y = find(&pdg, "int y = x;");
    assert!(pdg.has_data_edge(x, cond, "x"));
    assert!(pdg.has_data_edge(x, y, "x"));
    assert!(pdg.has_data_edge(reset, y, "x"));
    assert!(!pdg.has_data_edge(x, reset, "x"));
    assert_eq!(pdg.nodes[x].kind, NodeKind::Param);
    assert_eq!(pdg.out_control_edges(x).count(), 0);
}

#[test]
fn conditions_receive_data_edges() {
    let pdg = single("class T { void m(int x) { if (x > 0) { x = 0; } while (x < 9) { x++; } } }");
    let x = param(&pdg, "x");
    let branch = find(&pdg, "if (x > 0)");
    let reset = find(&pdg, "x = 0;");
    let head = find(&pdg, "while (x < 9)");
    let step = find(&pdg, "x++;");
    assert!(pdg.has_data_edge(x, branch, "x"));
    assert!(pdg.has_data_edge(x, head, "x"));
    assert!(pdg.has_data_edge(reset, head, "x"));
    assert!(pdg.has_data_edge(step, head, "x"));
    assert!(pdg.has_data_edge(step, step, "x"));
}

#[test]
fn field_flows_use_canonical_names() {
    let pdg = single(
        r#"
class T {
  int count;
  void m() {
    this.count = 1;
    log(count);
  }
}
"#,
    );
    let set = find(&pdg, "this.count = 1;");
    let log = find(&pdg, "log(count);");
    assert!(pdg.has_data_edge(set, log, "$THIS.count"));
}

#[test]
fn control_edges_mirror_the_cfg() {
    let code = r#"
class T {
  int m(int a, int b) {
    while (a > b) {
      a = a - b;
    }
    return a;
  }
}
"#;
    let unit = parse_java(code, "<mem>").unwrap();
    let cfgs = build_cfg(&unit);
    let pdgs = build_pdg(&unit).unwrap();
    assert_eq!(cfgs.len(), pdgs.len());
    for (cfg, pdg) in cfgs.iter().zip(&pdgs) {
        assert_eq!(pdg.nodes.len(), cfg.nodes.len() + pdg.params.len());
        assert_eq!(pdg.entry, cfg.entry);
        let control: Vec<_> = pdg
            .control_edges()
            .map(|e| (e.source, e.target, e.label.clone()))
            .collect();
        let expected: Vec<_> = cfg
            .edges
            .iter()
            .map(|e| (e.source, e.target, e.label.as_str().to_string()))
            .collect();
        assert_eq!(control, expected);
        for e in pdg.data_edges() {
            assert!(e.source < pdg.nodes.len() && e.target < pdg.nodes.len());
            assert!(pdg.nodes[e.source].has_def(&e.label));
        }
    }
}

#[test]
fn dot_export_marks_parameters_and_data_edges() {
    let pdg = single("class T { int m(int a) { int b = a; return b; } }");
    let dot = pdg.to_dot();
    assert!(dot.starts_with("digraph PDG {"));
    assert!(dot.contains("fillcolor=orange"));
    assert!(dot.contains("label=\" a\""));
    assert!(dot.contains("label=\" b\""));
}
