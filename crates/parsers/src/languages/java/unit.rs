use ir::SyntaxId;
use std::collections::HashMap;
use tree_sitter::{Node, Tree};

/// A parsed Java compilation unit.
///
/// Owns the source text and the tree-sitter tree. Every named node of the
/// tree receives a [`SyntaxId`] in a single pre-order pass at parse time, so
/// graphs and analysis facts built from separate walks of the same tree can
/// be joined on it.
#[derive(Debug)]
pub struct JavaUnit {
    pub(crate) path: String,
    pub(crate) source: String,
    pub(crate) tree: Tree,
    pub(crate) ids: HashMap<usize, SyntaxId>,
    pub(crate) package: Option<String>,
    pub(crate) imports: Vec<String>,
}

impl JavaUnit {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// 1-based line on which `node` starts.
    pub fn line(&self, node: Node<'_>) -> usize {
        node.start_position().row + 1
    }

    /// Stable identity of a named node of this unit's tree.
    pub fn id(&self, node: Node<'_>) -> Option<SyntaxId> {
        self.ids.get(&node.id()).copied()
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }
}

/// Numbers every named node in pre-order.
pub(crate) fn assign_ids(tree: &Tree) -> HashMap<usize, SyntaxId> {
    let mut ids = HashMap::new();
    let mut next = 0u32;
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_named() {
            ids.insert(node.id(), SyntaxId(next));
            next += 1;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return ids;
            }
        }
    }
}
