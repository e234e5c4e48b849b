use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::cfg::{ControlFlowGraph, ControlLabel};
use crate::export::{escape_dot, GraphDocument, JsonEdge, JsonNode};
use crate::node::{NodeId, NodeKind, StatementNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependenceKind {
    Control,
    Data,
}

impl DependenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependenceKind::Control => "Control",
            DependenceKind::Data => "Data",
        }
    }
}

/// Edge of a program dependence graph.
///
/// Control edges carry the CFG label, data edges the variable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependenceEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: DependenceKind,
    pub label: String,
}

/// Program dependence graph of one method-like unit: the control edges of
/// its CFG plus data-dependence edges, and one def-only pseudo-node per
/// formal parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDependenceGraph {
    pub name: String,
    pub entry: NodeId,
    /// Parameter pseudo-nodes in declaration order.
    pub params: Vec<NodeId>,
    pub nodes: Vec<StatementNode>,
    pub edges: Vec<DependenceEdge>,
}

impl ProgramDependenceGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: 0,
            params: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Copies the nodes and edges of a built CFG into this graph, tagging
    /// every edge as control. The CFG entry becomes the PDG entry.
    pub fn attach_cfg(&mut self, cfg: &ControlFlowGraph) {
        let offset = self.nodes.len();
        for node in &cfg.nodes {
            let mut copy = node.clone();
            copy.id = offset + node.id;
            self.nodes.push(copy);
        }
        for e in &cfg.edges {
            self.edges.push(DependenceEdge {
                source: offset + e.source,
                target: offset + e.target,
                kind: DependenceKind::Control,
                label: e.label.as_str().to_string(),
            });
        }
        self.entry = offset + cfg.entry;
    }

    /// Inserts def-only parameter nodes. They receive no control edges.
    pub fn add_params(&mut self, params: impl IntoIterator<Item = StatementNode>) {
        for mut node in params {
            let id = self.nodes.len();
            node.id = id;
            node.kind = NodeKind::Param;
            self.nodes.push(node);
            self.params.push(id);
        }
    }

    pub fn add_data_edge(&mut self, source: NodeId, target: NodeId, var: &str) {
        self.edges.push(DependenceEdge {
            source,
            target,
            kind: DependenceKind::Data,
            label: var.to_string(),
        });
    }

    pub fn node(&self, id: NodeId) -> Option<&StatementNode> {
        self.nodes.get(id)
    }

    pub fn control_edges(&self) -> impl Iterator<Item = &DependenceEdge> + '_ {
        self.edges
            .iter()
            .filter(|e| e.kind == DependenceKind::Control)
    }

    pub fn data_edges(&self) -> impl Iterator<Item = &DependenceEdge> + '_ {
        self.edges.iter().filter(|e| e.kind == DependenceKind::Data)
    }

    pub fn out_control_edges(&self, id: NodeId) -> impl Iterator<Item = &DependenceEdge> + '_ {
        self.control_edges().filter(move |e| e.source == id)
    }

    /// Control successors of every node, indexed by source.
    pub fn control_adjacency(&self) -> Vec<Vec<NodeId>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for e in self.control_edges() {
            if let Some(list) = adj.get_mut(e.source) {
                list.push(e.target);
            }
        }
        adj
    }

    /// Returns `true` when a data edge `source -> target` labeled `var`
    /// exists.
    pub fn has_data_edge(&self, source: NodeId, target: NodeId, var: &str) -> bool {
        self.data_edges()
            .any(|e| e.source == source && e.target == target && e.label == var)
    }

    /// Exports the graph to DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph PDG {{");
        let _ = writeln!(out, "    // {}", escape_dot(&self.name));
        for &id in &self.params {
            if let Some(node) = self.nodes.get(id) {
                let _ = writeln!(
                    out,
                    "    v{id} [label=\"{}\", shape=box, style=filled, fillcolor=orange];",
                    escape_dot(&node.label())
                );
            }
        }
        for node in self.nodes.iter().filter(|n| n.kind != NodeKind::Param) {
            let _ = writeln!(out, "    v{} [label=\"{}\"];", node.id, escape_dot(&node.label()));
        }
        for e in self.control_edges() {
            let _ = writeln!(
                out,
                "    v{} -> v{} [arrowhead=empty, color=gray, style=dashed, label=\"{}\"];",
                e.source,
                e.target,
                escape_dot(&e.label)
            );
        }
        for e in self.data_edges() {
            let _ = writeln!(
                out,
                "    v{} -> v{} [style=bold, label=\" {}\"];",
                e.source,
                e.target,
                escape_dot(&e.label)
            );
        }
        let _ = writeln!(out, "}}");
        out
    }

    /// Exports the graph to JSON. Control edges are listed before data
    /// edges.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let edges = self
            .control_edges()
            .chain(self.data_edges())
            .enumerate()
            .map(|(id, e)| JsonEdge {
                id,
                source: e.source,
                target: e.target,
                kind: Some(e.kind.as_str()),
                label: &e.label,
            })
            .collect();
        let doc = GraphDocument {
            directed: true,
            multigraph: true,
            label: "PDG",
            kind: "Program Dependence Graph (PDG)",
            name: &self.name,
            nodes: self.nodes.iter().map(JsonNode::with_facts).collect(),
            edges,
        };
        serde_json::to_string_pretty(&doc)
    }
}

impl From<&ControlFlowGraph> for ProgramDependenceGraph {
    fn from(cfg: &ControlFlowGraph) -> Self {
        let mut pdg = ProgramDependenceGraph::new(cfg.name.clone());
        pdg.attach_cfg(cfg);
        pdg
    }
}

/// Control label of a PDG control edge, if it maps back to one.
pub fn control_label(edge: &DependenceEdge) -> Option<ControlLabel> {
    if edge.kind != DependenceKind::Control {
        return None;
    }
    [
        ControlLabel::Epsilon,
        ControlLabel::True,
        ControlLabel::False,
        ControlLabel::Throws,
        ControlLabel::Return,
    ]
    .into_iter()
    .find(|l| l.as_str() == edge.label)
}
