use anyhow::{Context, Result};
use tracing::{debug, warn};
use tree_sitter::Node;

use super::unit::{assign_ids, JavaUnit};

/// Parses Java source text into a [`JavaUnit`].
///
/// Syntax errors do not fail the parse: tree-sitter still produces a tree
/// and analysis proceeds on a best-effort basis.
pub fn parse_java(source: &str, path: &str) -> Result<JavaUnit> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(tree_sitter_java::language())
        .context("load java grammar")?;
    let tree = parser
        .parse(source, None)
        .with_context(|| format!("failed to parse java source: {path}"))?;
    let root = tree.root_node();
    if root.has_error() {
        warn!(file = path, "java source contains parse errors");
    }
    let (package, imports) = header(root, source);
    let ids = assign_ids(&tree);
    debug!(file = path, nodes = ids.len(), package = ?package, "Java unit parsed");
    Ok(JavaUnit {
        path: path.to_string(),
        source: source.to_string(),
        tree,
        ids,
        package,
        imports,
    })
}

/// Reads the package name and the import list from the top of the unit.
fn header(root: Node<'_>, source: &str) -> (Option<String>, Vec<String>) {
    let mut package = None;
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_declaration" => {
                let mut inner = child.walk();
                package = child
                    .named_children(&mut inner)
                    .find(|n| matches!(n.kind(), "identifier" | "scoped_identifier"))
                    .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                    .map(str::to_string);
            }
            "import_declaration" => {
                let text = child.utf8_text(source.as_bytes()).unwrap_or("");
                let name = text
                    .trim()
                    .trim_start_matches("import")
                    .trim_end_matches(';')
                    .trim();
                imports.push(name.split_whitespace().collect::<Vec<_>>().join(" "));
            }
            _ => {}
        }
    }
    (package, imports)
}
