use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Index of a node inside the arena of a single graph.
pub type NodeId = usize;

/// Stable identity of a syntax tree node, assigned once per parsed unit.
///
/// Graph nodes keep the identity of the tree node they were built from so
/// that analysis facts computed on the tree can be matched back onto them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SyntaxId(pub u32);

/// Role of a node inside a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Method, constructor or initializer entry.
    Entry,
    /// Formal parameter pseudo-node of a PDG.
    Param,
    /// Node built from a statement or statement header.
    Statement,
    /// Join point introduced by the builder (`end-if`, `end-try`, ...).
    Synthetic,
}

/// A statement-level graph vertex together with its def/use facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementNode {
    pub id: NodeId,
    /// 1-based source line, `0` for synthetic nodes.
    pub line: usize,
    pub code: String,
    /// Symbolic form computed by the def/use analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    pub kind: NodeKind,
    #[serde(default)]
    pub defs: BTreeSet<String>,
    #[serde(default)]
    pub uses: BTreeSet<String>,
    #[serde(default)]
    pub self_flows: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<SyntaxId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, String>,
}

impl StatementNode {
    pub fn new(kind: NodeKind, line: usize, code: impl Into<String>) -> Self {
        Self {
            id: 0,
            line,
            code: code.into(),
            normalized: None,
            kind,
            defs: BTreeSet::new(),
            uses: BTreeSet::new(),
            self_flows: BTreeSet::new(),
            key: None,
            props: BTreeMap::new(),
        }
    }

    /// Join point with no source location.
    pub fn synthetic(code: impl Into<String>) -> Self {
        Self::new(NodeKind::Synthetic, 0, code)
    }

    pub fn with_key(mut self, key: Option<SyntaxId>) -> Self {
        self.key = key;
        self
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<String>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    /// Records a definition; returns `true` when the set grew.
    pub fn add_def(&mut self, var: impl Into<String>) -> bool {
        self.defs.insert(var.into())
    }

    /// Records a use; returns `true` when the set grew.
    pub fn add_use(&mut self, var: impl Into<String>) -> bool {
        self.uses.insert(var.into())
    }

    /// Records a self-flow; returns `true` when the set grew.
    pub fn add_self_flow(&mut self, var: impl Into<String>) -> bool {
        self.self_flows.insert(var.into())
    }

    pub fn has_def(&self, var: &str) -> bool {
        self.defs.contains(var)
    }

    pub fn has_use(&self, var: &str) -> bool {
        self.uses.contains(var)
    }

    pub fn is_synthetic(&self) -> bool {
        self.kind == NodeKind::Synthetic
    }

    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    /// Copies the def/use facts (and normalized form) of `other` into this
    /// node.
    pub fn merge_facts(&mut self, other: &StatementNode) {
        self.defs.extend(other.defs.iter().cloned());
        self.uses.extend(other.uses.iter().cloned());
        self.self_flows.extend(other.self_flows.iter().cloned());
        if other.normalized.is_some() {
            self.normalized = other.normalized.clone();
        }
    }

    /// Display label used by the exporters: `"L:  code"`, or just the code
    /// when the node has no line.
    pub fn label(&self) -> String {
        if self.line > 0 {
            format!("{}:  {}", self.line, self.code)
        } else {
            self.code.clone()
        }
    }
}
