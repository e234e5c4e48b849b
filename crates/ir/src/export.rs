//! Shared pieces of the DOT and JSON exporters.

use serde::Serialize;

use crate::node::StatementNode;

/// Escapes a label for use inside a double-quoted DOT string.
pub(crate) fn escape_dot(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Mermaid labels cannot contain raw quotes or newlines.
pub(crate) fn escape_mermaid(text: &str) -> String {
    text.replace('"', "#quot;").replace(['\n', '\r'], " ")
}

#[derive(Serialize)]
pub(crate) struct GraphDocument<'a> {
    pub directed: bool,
    pub multigraph: bool,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'a str,
    pub nodes: Vec<JsonNode<'a>>,
    pub edges: Vec<JsonEdge<'a>>,
}

#[derive(Serialize)]
pub(crate) struct JsonNode<'a> {
    pub id: usize,
    pub line: usize,
    pub label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defs: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<Vec<&'a str>>,
}

impl<'a> JsonNode<'a> {
    pub fn plain(node: &'a StatementNode) -> Self {
        Self {
            id: node.id,
            line: node.line,
            label: &node.code,
            defs: None,
            uses: None,
        }
    }

    pub fn with_facts(node: &'a StatementNode) -> Self {
        Self {
            defs: Some(node.defs.iter().map(String::as_str).collect()),
            uses: Some(node.uses.iter().map(String::as_str).collect()),
            ..Self::plain(node)
        }
    }
}

#[derive(Serialize)]
pub(crate) struct JsonEdge<'a> {
    pub id: usize,
    pub source: usize,
    pub target: usize,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub label: &'a str,
}
