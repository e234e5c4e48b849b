use super::*;
use serde_json::Value as JsonValue;

fn sample_cfg() -> ControlFlowGraph {
    let mut cfg = ControlFlowGraph::new("T.m(int x)");
    let entry = cfg.add_node(StatementNode::new(NodeKind::Entry, 2, "void m(int x)"));
    let cond = cfg.add_node(StatementNode::new(NodeKind::Statement, 3, "if (x > 0)"));
    let call = cfg.add_node(StatementNode::new(NodeKind::Statement, 4, "log(\"pos\");"));
    let end = cfg.add_node(StatementNode::synthetic("end-if:3"));
    cfg.add_edge(entry, cond, ControlLabel::Epsilon);
    cfg.add_edge(cond, call, ControlLabel::True);
    cfg.add_edge(cond, end, ControlLabel::False);
    cfg.add_edge(call, end, ControlLabel::Epsilon);
    cfg
}

// Set adders report growth so the fixpoint can detect changes.
#[test]
fn statement_node_adders_report_growth() {
    let mut node = StatementNode::new(NodeKind::Statement, 1, "x++;");
    assert!(node.add_def("x"));
    assert!(!node.add_def("x"));
    assert!(node.add_use("x"));
    assert!(node.add_self_flow("x"));
    assert!(!node.add_self_flow("x"));
    assert!(node.has_def("x") && node.has_use("x"));
}

#[test]
fn synthetic_label_has_no_line_prefix() {
    let node = StatementNode::synthetic("end-while:7");
    assert_eq!(node.line, 0);
    assert_eq!(node.label(), "end-while:7");
    let stmt = StatementNode::new(NodeKind::Statement, 12, "x = 1;");
    assert_eq!(stmt.label(), "12:  x = 1;");
}

#[test]
fn cfg_dot_labels_edges_and_escapes_quotes() {
    let dot = sample_cfg().to_dot();
    assert!(dot.starts_with("digraph CFG {"));
    assert!(dot.contains("v1 -> v2 [label=\"True\"];"));
    assert!(dot.contains("v0 -> v1;"));
    assert!(dot.contains("log(\\\"pos\\\");"));
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn cfg_dot_layout_is_one_statement_per_line() {
    let expected = r#"digraph CFG {
    // T.m(int x)
    v0 [label="2:  void m(int x)"];
    v1 [label="3:  if (x > 0)"];
    v2 [label="4:  log(\"pos\");"];
    v3 [label="end-if:3"];
    v0 -> v1;
    v1 -> v2 [label="True"];
    v1 -> v3 [label="False"];
    v2 -> v3;
}
"#;
    assert_eq!(sample_cfg().to_dot(), expected);
}

#[test]
fn cfg_mermaid_uses_labeled_arrows() {
    let mermaid = sample_cfg().to_mermaid();
    assert!(mermaid.starts_with("graph TD"));
    assert!(mermaid.contains("v1 -->|False| v3"));
    assert!(mermaid.contains("#quot;pos#quot;"));
}

#[test]
fn cfg_json_has_graph_header() {
    let json = sample_cfg().to_json().unwrap();
    let v: JsonValue = serde_json::from_str(&json).unwrap();
    assert_eq!(v["directed"], true);
    assert_eq!(v["multigraph"], true);
    assert_eq!(v["label"], "CFG");
    assert_eq!(v["type"], "Control Flow Graph (CFG)");
    assert_eq!(v["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(v["edges"][1]["label"], "True");
    assert!(v["edges"][0].get("type").is_none());
}

// Nodes that cannot be reached from the entry are dropped and ids compacted.
#[test]
fn retain_reachable_reindexes_arena() {
    let mut cfg = sample_cfg();
    let dead = cfg.add_node(StatementNode::new(NodeKind::Statement, 9, "dead();"));
    let end = 3;
    cfg.add_edge(dead, end, ControlLabel::Epsilon);
    assert_eq!(cfg.retain_reachable(), 1);
    assert_eq!(cfg.nodes.len(), 4);
    for (i, node) in cfg.nodes.iter().enumerate() {
        assert_eq!(node.id, i);
    }
    assert!(cfg.edges.iter().all(|e| e.source < 4 && e.target < 4));
    assert_eq!(cfg.edges.len(), 4);
}

#[test]
fn pdg_attach_and_params() {
    let cfg = sample_cfg();
    let mut pdg = ProgramDependenceGraph::from(&cfg);
    let mut param = StatementNode::new(NodeKind::Statement, 2, "int x");
    param.add_def("x");
    pdg.add_params(vec![param]);
    assert_eq!(pdg.params, vec![4]);
    assert_eq!(pdg.nodes[4].kind, NodeKind::Param);
    assert_eq!(pdg.control_edges().count(), cfg.edges.len());
    assert_eq!(pdg.out_control_edges(4).count(), 0);

    pdg.add_data_edge(4, 1, "x");
    assert!(pdg.has_data_edge(4, 1, "x"));
    assert!(!pdg.has_data_edge(1, 4, "x"));
    let adj = pdg.control_adjacency();
    assert_eq!(adj[1], vec![2, 3]);
    assert!(adj[4].is_empty());
}

#[test]
fn pdg_exports_params_first_and_edge_types() {
    let mut pdg = ProgramDependenceGraph::from(&sample_cfg());
    let mut param = StatementNode::new(NodeKind::Param, 2, "int x");
    param.add_def("x");
    pdg.add_params(vec![param]);
    pdg.add_data_edge(4, 1, "x");

    let dot = pdg.to_dot();
    let param_pos = dot.find("fillcolor=orange").unwrap();
    let entry_pos = dot.find("v0 [label=").unwrap();
    assert!(param_pos < entry_pos);
    assert!(dot.contains("v4 -> v1 [style=bold, label=\" x\"];"));
    assert!(dot.contains("arrowhead=empty, color=gray, style=dashed"));

    let v: JsonValue = serde_json::from_str(&pdg.to_json().unwrap()).unwrap();
    assert_eq!(v["label"], "PDG");
    let edges = v["edges"].as_array().unwrap();
    assert_eq!(edges.last().unwrap()["type"], "Data");
    assert_eq!(edges[0]["type"], "Control");
    assert_eq!(v["nodes"][4]["defs"][0], "x");
}

#[test]
fn control_label_round_trips_through_pdg_edges() {
    let pdg = ProgramDependenceGraph::from(&sample_cfg());
    let labels: Vec<_> = pdg
        .control_edges()
        .filter_map(pdg::control_label)
        .collect();
    assert_eq!(
        labels,
        vec![
            ControlLabel::Epsilon,
            ControlLabel::True,
            ControlLabel::False,
            ControlLabel::Epsilon
        ]
    );
}
