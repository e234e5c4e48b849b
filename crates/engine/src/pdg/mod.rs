//! Program dependence graphs: control edges copied from the CFG plus data
//! edges from every definition to the uses it reaches.

use anyhow::Result;
use ir::{ControlFlowGraph, NodeId, ProgramDependenceGraph};
use parsers::JavaUnit;
use std::collections::HashSet;
use tracing::debug;

mod traversal;

pub use traversal::PathTraversal;

use crate::cfg::build_cfg;
use crate::defuse::Analyzer;
use crate::EngineConfig;

/// Builds one PDG per method-like member of `unit` with the default
/// configuration.
pub fn build_pdg(unit: &JavaUnit) -> Result<Vec<ProgramDependenceGraph>> {
    build_pdg_with_config(unit, &EngineConfig::default())
}

pub fn build_pdg_with_config(unit: &JavaUnit, config: &EngineConfig) -> Result<Vec<ProgramDependenceGraph>> {
    let mut analyzer = Analyzer::new(unit, config);
    let passes = analyzer.run_fixpoint()?;
    debug!(file = unit.path(), passes, "Def/use analysis converged");
    let graphs = build_cfg(unit)
        .iter()
        .map(|cfg| assemble(cfg, &analyzer))
        .collect();
    Ok(graphs)
}

/// Merges the analyzer facts into a copy of `cfg` and computes its data
/// edges.
pub fn assemble(cfg: &ControlFlowGraph, analyzer: &Analyzer<'_>) -> ProgramDependenceGraph {
    let mut pdg = ProgramDependenceGraph::from(cfg);
    for node in &mut pdg.nodes {
        if let Some(fact) = node.key.and_then(|k| analyzer.fact(k)) {
            node.merge_facts(fact);
        }
    }
    let entry_key = pdg.node(pdg.entry).and_then(|n| n.key);
    if let Some(key) = entry_key {
        pdg.add_params(analyzer.params(key).iter().cloned());
    }
    let edges = propagate(&pdg);
    debug!(graph = %pdg.name, data_edges = edges.len(), "Data dependences computed");
    for (source, target, var) in edges {
        pdg.add_data_edge(source, target, &var);
    }
    pdg
}

/// Collects the data edges of `pdg` in discovery order, without duplicates.
fn propagate(pdg: &ProgramDependenceGraph) -> Vec<(NodeId, NodeId, String)> {
    let adj = pdg.control_adjacency();
    let mut edges = Edges::default();

    for &param in &pdg.params {
        let node = &pdg.nodes[param];
        for var in &node.self_flows {
            edges.push(param, param, var);
        }
        for var in &node.defs {
            search(pdg, &adj, pdg.entry, param, var, &mut edges);
        }
    }

    let mut seen = HashSet::new();
    let mut walk = PathTraversal::new(&adj, pdg.entry);
    while let Some(id) = walk.next() {
        if !seen.insert(id) {
            walk.continue_next_path();
            continue;
        }
        let node = &pdg.nodes[id];
        for var in &node.self_flows {
            edges.push(id, id, var);
        }
        for var in &node.defs {
            search(pdg, &adj, id, id, var, &mut edges);
        }
    }
    edges.into_inner()
}

/// Walks the paths leaving `start` and links `def` to every node using
/// `var` before the variable is redefined.
fn search(
    pdg: &ProgramDependenceGraph,
    adj: &[Vec<NodeId>],
    start: NodeId,
    def: NodeId,
    var: &str,
    edges: &mut Edges,
) {
    let mut visited = HashSet::new();
    let mut walk = PathTraversal::new(adj, start);
    let mut first = true;
    while let Some(id) = walk.next() {
        if std::mem::take(&mut first) {
            visited.insert(id);
            continue;
        }
        if !visited.insert(id) {
            walk.continue_next_path();
            continue;
        }
        let node = &pdg.nodes[id];
        if node.has_use(var) {
            edges.push(def, id, var);
        }
        if node.has_def(var) {
            walk.continue_next_path();
        }
    }
}

#[derive(Default)]
struct Edges {
    list: Vec<(NodeId, NodeId, String)>,
    seen: HashSet<(NodeId, NodeId, String)>,
}

impl Edges {
    fn push(&mut self, source: NodeId, target: NodeId, var: &str) {
        let edge = (source, target, var.to_string());
        if self.seen.insert(edge.clone()) {
            self.list.push(edge);
        }
    }

    fn into_inner(self) -> Vec<(NodeId, NodeId, String)> {
        self.list
    }
}

#[cfg(test)]
mod tests;
