//! Graph model shared by the analysis engine and the exporters.
//!
//! A [`ControlFlowGraph`] holds the statement nodes of one method-like unit
//! and the labeled control edges between them. A
//! [`ProgramDependenceGraph`] is built from a finished CFG: it keeps the
//! control edges, adds one def-only node per formal parameter and the data
//! dependence edges computed by the engine. Both graphs are arenas indexed by
//! [`NodeId`] and export to DOT and JSON.

pub mod cfg;
mod export;
pub mod node;
pub mod pdg;

pub use cfg::{ControlEdge, ControlFlowGraph, ControlLabel};
pub use node::{NodeId, NodeKind, StatementNode, SyntaxId};
pub use pdg::{DependenceEdge, DependenceKind, ProgramDependenceGraph};

#[cfg(test)]
mod tests;
