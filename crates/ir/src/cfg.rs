use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::{self, Write as _};

use crate::export::{escape_dot, escape_mermaid, GraphDocument, JsonEdge, JsonNode};
use crate::node::{NodeId, StatementNode};

/// Label carried by a control flow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlLabel {
    Epsilon,
    True,
    False,
    /// Reserved, never produced by the builder.
    Throws,
    /// Reserved, never produced by the builder.
    Return,
}

impl ControlLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlLabel::Epsilon => "",
            ControlLabel::True => "True",
            ControlLabel::False => "False",
            ControlLabel::Throws => "Throws",
            ControlLabel::Return => "Return",
        }
    }
}

impl fmt::Display for ControlLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub label: ControlLabel,
}

/// Control flow graph of one method-like unit.
///
/// Nodes live in an arena indexed by [`NodeId`]; a node's `id` always equals
/// its position in `nodes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub name: String,
    pub entry: NodeId,
    pub nodes: Vec<StatementNode>,
    pub edges: Vec<ControlEdge>,
}

impl ControlFlowGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Adds a node to the arena and returns its id.
    pub fn add_node(&mut self, mut node: StatementNode) -> NodeId {
        let id = self.nodes.len();
        node.id = id;
        self.nodes.push(node);
        id
    }

    pub fn add_edge(&mut self, source: NodeId, target: NodeId, label: ControlLabel) {
        self.edges.push(ControlEdge {
            source,
            target,
            label,
        });
    }

    pub fn node(&self, id: NodeId) -> Option<&StatementNode> {
        self.nodes.get(id)
    }

    pub fn out_edges(&self, id: NodeId) -> impl Iterator<Item = &ControlEdge> + '_ {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn in_edges(&self, id: NodeId) -> impl Iterator<Item = &ControlEdge> + '_ {
        self.edges.iter().filter(move |e| e.target == id)
    }

    pub fn successors(&self, id: NodeId) -> impl Iterator<Item = (NodeId, ControlLabel)> + '_ {
        self.out_edges(id).map(|e| (e.target, e.label))
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.out_edges(id).count()
    }

    /// Adjacency lists indexed by source node.
    pub fn adjacency(&self) -> Vec<Vec<NodeId>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for e in &self.edges {
            if let Some(list) = adj.get_mut(e.source) {
                list.push(e.target);
            }
        }
        adj
    }

    /// Marks every node reachable from `start` along control edges.
    pub fn reachable_from(&self, start: NodeId) -> Vec<bool> {
        let adj = self.adjacency();
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        if start < seen.len() {
            seen[start] = true;
            queue.push_back(start);
        }
        while let Some(n) = queue.pop_front() {
            for &m in &adj[n] {
                if !seen[m] {
                    seen[m] = true;
                    queue.push_back(m);
                }
            }
        }
        seen
    }

    /// Drops nodes unreachable from the entry and compacts the arena.
    ///
    /// Returns the number of removed nodes.
    pub fn retain_reachable(&mut self) -> usize {
        let seen = self.reachable_from(self.entry);
        let mut remap = vec![None; self.nodes.len()];
        let mut kept = Vec::with_capacity(self.nodes.len());
        for (old, mut node) in std::mem::take(&mut self.nodes).into_iter().enumerate() {
            if seen[old] {
                let id = kept.len();
                remap[old] = Some(id);
                node.id = id;
                kept.push(node);
            }
        }
        let removed = seen.len() - kept.len();
        self.nodes = kept;
        self.edges = self
            .edges
            .iter()
            .filter_map(|e| match (remap[e.source], remap[e.target]) {
                (Some(source), Some(target)) => Some(ControlEdge {
                    source,
                    target,
                    label: e.label,
                }),
                _ => None,
            })
            .collect();
        self.entry = remap[self.entry].unwrap_or(0);
        removed
    }

    /// Exports the graph to DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph CFG {{");
        let _ = writeln!(out, "    // {}", escape_dot(&self.name));
        for node in &self.nodes {
            let _ = writeln!(out, "    v{} [label=\"{}\"];", node.id, escape_dot(&node.label()));
        }
        for e in &self.edges {
            let _ = match e.label {
                ControlLabel::Epsilon => writeln!(out, "    v{} -> v{};", e.source, e.target),
                label => writeln!(out, "    v{} -> v{} [label=\"{label}\"];", e.source, e.target),
            };
        }
        let _ = writeln!(out, "}}");
        out
    }

    /// Exports the graph to Mermaid format.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "graph TD");
        for node in &self.nodes {
            let _ = writeln!(out, "    v{}[\"{}\"]", node.id, escape_mermaid(&node.label()));
        }
        for e in &self.edges {
            let _ = match e.label {
                ControlLabel::Epsilon => writeln!(out, "    v{} --> v{}", e.source, e.target),
                label => writeln!(out, "    v{} -->|{label}| v{}", e.source, e.target),
            };
        }
        out
    }

    /// Exports the graph to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let doc = GraphDocument {
            directed: true,
            multigraph: true,
            label: "CFG",
            kind: "Control Flow Graph (CFG)",
            name: &self.name,
            nodes: self.nodes.iter().map(JsonNode::plain).collect(),
            edges: self
                .edges
                .iter()
                .enumerate()
                .map(|(id, e)| JsonEdge {
                    id,
                    source: e.source,
                    target: e.target,
                    kind: None,
                    label: e.label.as_str(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&doc)
    }
}
